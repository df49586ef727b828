use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service_core::error::AppError;

use super::store::BillingStore;
use crate::models::{
    Customer, EntityCounts, Invoice, InvoiceRollup, InvoiceStatus, ListQuery, Page, Payment,
    PaymentStatus, Product, Quote, QuoteStatus,
};

#[derive(Debug, Serialize, Deserialize)]
struct SequenceCounter {
    #[serde(rename = "_id")]
    key: String,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct AmountRecord {
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct GrossRecord {
    gross: Decimal,
}

#[derive(Debug, Deserialize)]
struct RollupRecord {
    customer_id: String,
    status: InvoiceStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    issue_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    due_date: Option<DateTime<Utc>>,
    totals: GrossRecord,
}

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for invoicing-service");

        let unique_number = || {
            IndexModel::builder()
                .keys(doc! { "number": 1 })
                .options(
                    IndexOptions::builder()
                        .name("number_unique".to_string())
                        .unique(true)
                        .build(),
                )
                .build()
        };

        self.invoices()
            .create_index(unique_number(), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create number index on invoices collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on invoices.number");

        self.quotes()
            .create_index(unique_number(), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create number index on quotes collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on quotes.number");

        let unique_sku = IndexModel::builder()
            .keys(doc! { "sku": 1 })
            .options(
                IndexOptions::builder()
                    .name("sku_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.products()
            .create_index(unique_sku, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create sku index on products collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on products.sku");

        let invoice_lookup = IndexModel::builder()
            .keys(doc! { "invoice_id": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("invoice_lookup".to_string())
                    .build(),
            )
            .build();

        self.payments()
            .create_index(invoice_lookup, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create invoice index on payments collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on payments.(invoice_id, status)");

        Ok(())
    }

    pub fn customers(&self) -> Collection<Customer> {
        self.db.collection("customers")
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub fn quotes(&self) -> Collection<Quote> {
        self.db.collection("quotes")
    }

    pub fn payments(&self) -> Collection<Payment> {
        self.db.collection("payments")
    }

    fn sequences(&self) -> Collection<SequenceCounter> {
        self.db.collection("sequences")
    }
}

/// Escapes regex metacharacters so user input is matched literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match on any of `fields`.
fn search_filter(search: Option<&str>, fields: &[&str]) -> Document {
    match search {
        Some(needle) => {
            let pattern = escape_regex(needle);
            let clauses: Vec<Document> = fields
                .iter()
                .map(|field| {
                    let mut clause = Document::new();
                    clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                    clause
                })
                .collect();
            doc! { "$or": clauses }
        }
        None => doc! {},
    }
}

async fn find_page<T>(
    collection: Collection<T>,
    filter: Document,
    query: &ListQuery,
) -> Result<Page<T>, AppError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection.count_documents(filter.clone(), None).await?;

    let direction = if query.newest_first { -1 } else { 1 };
    let options = FindOptions::builder()
        .sort(doc! { "created_at": direction, "_id": direction })
        .skip(query.skip())
        .limit(query.page_size as i64)
        .build();

    let items: Vec<T> = collection.find(filter, options).await?.try_collect().await?;

    Ok(Page {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
    })
}

#[async_trait]
impl BillingStore for MongoDb {
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn next_sequence(&self, key: &str) -> Result<i64, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .sequences()
            .find_one_and_update(doc! { "_id": key }, doc! { "$inc": { "value": 1_i64 } }, options)
            .await?
            .ok_or_else(|| {
                AppError::DatabaseError(anyhow::anyhow!("Sequence {} was not returned", key))
            })?;

        Ok(counter.value)
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<(), AppError> {
        self.customers().insert_one(customer, None).await?;
        Ok(())
    }

    async fn find_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.customers().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace_customer(&self, customer: &Customer) -> Result<bool, AppError> {
        let result = self
            .customers()
            .replace_one(doc! { "_id": customer.id.as_str() }, customer, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        let result = self.customers().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>, AppError> {
        let filter = search_filter(query.search.as_deref(), &["name", "email"]);
        find_page(self.customers(), filter, query).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        self.products().insert_one(product, None).await?;
        Ok(())
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        Ok(self.products().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace_product(&self, product: &Product) -> Result<bool, AppError> {
        let result = self
            .products()
            .replace_one(doc! { "_id": product.id.as_str() }, product, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_product(&self, id: &str) -> Result<bool, AppError> {
        let result = self.products().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, AppError> {
        let filter = search_filter(query.search.as_deref(), &["name", "sku"]);
        find_page(self.products(), filter, query).await
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.invoices().insert_one(invoice, None).await?;
        Ok(())
    }

    async fn find_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        Ok(self.invoices().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace_invoice(&self, invoice: &Invoice) -> Result<bool, AppError> {
        let result = self
            .invoices()
            .replace_one(doc! { "_id": invoice.id.as_str() }, invoice, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<bool, AppError> {
        let update = doc! {
            "$set": {
                "status": to_bson(&status)?,
                "updated_at": mongodb::bson::DateTime::from_chrono(Utc::now()),
            }
        };
        let result = self
            .invoices()
            .update_one(doc! { "_id": id }, update, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError> {
        let result = self.invoices().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_invoices(&self, query: &ListQuery) -> Result<Page<Invoice>, AppError> {
        let filter = search_filter(query.search.as_deref(), &["number", "status"]);
        find_page(self.invoices(), filter, query).await
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<(), AppError> {
        self.quotes().insert_one(quote, None).await?;
        Ok(())
    }

    async fn find_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        Ok(self.quotes().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace_quote(&self, quote: &Quote) -> Result<bool, AppError> {
        let result = self
            .quotes()
            .replace_one(doc! { "_id": quote.id.as_str() }, quote, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_quote(&self, id: &str) -> Result<bool, AppError> {
        let result = self.quotes().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_quotes(&self, query: &ListQuery) -> Result<Page<Quote>, AppError> {
        let filter = search_filter(query.search.as_deref(), &["number", "status"]);
        find_page(self.quotes(), filter, query).await
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError> {
        self.payments().insert_one(payment, None).await?;
        Ok(())
    }

    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        Ok(self.payments().find_one(doc! { "_id": id }, None).await?)
    }

    async fn replace_payment(&self, payment: &Payment) -> Result<bool, AppError> {
        let result = self
            .payments()
            .replace_one(doc! { "_id": payment.id.as_str() }, payment, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        Ok(self
            .payments()
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?)
    }

    async fn list_payments(
        &self,
        query: &ListQuery,
        invoice_id: Option<&str>,
    ) -> Result<Page<Payment>, AppError> {
        let mut filter = search_filter(query.search.as_deref(), &["method", "reference"]);
        if let Some(invoice_id) = invoice_id {
            filter.insert("invoice_id", invoice_id);
        }
        find_page(self.payments(), filter, query).await
    }

    async fn received_total(&self, invoice_id: &str) -> Result<Decimal, AppError> {
        // Amounts are stored as exact decimal strings, so they are summed here
        // rather than with `$sum`.
        let filter = doc! {
            "invoice_id": invoice_id,
            "status": to_bson(&PaymentStatus::Received)?,
        };
        let options = FindOptions::builder().projection(doc! { "amount": 1 }).build();

        let amounts: Vec<AmountRecord> = self
            .db
            .collection::<AmountRecord>("payments")
            .find(filter, options)
            .await?
            .try_collect()
            .await?;

        Ok(amounts.into_iter().map(|record| record.amount).sum())
    }

    async fn entity_counts(&self) -> Result<EntityCounts, AppError> {
        let customers = self.customers().count_documents(doc! {}, None).await?;
        let products = self.products().count_documents(doc! {}, None).await?;
        let invoices = self.invoices().count_documents(doc! {}, None).await?;
        let quotes = self.quotes().count_documents(doc! {}, None).await?;
        let open_quotes = self
            .quotes()
            .count_documents(doc! { "status": to_bson(&QuoteStatus::Sent)? }, None)
            .await?;

        Ok(EntityCounts {
            customers,
            products,
            invoices,
            quotes,
            open_quotes,
        })
    }

    async fn invoice_rollups(&self) -> Result<Vec<InvoiceRollup>, AppError> {
        let options = FindOptions::builder()
            .projection(doc! {
                "customer_id": 1,
                "status": 1,
                "issue_date": 1,
                "due_date": 1,
                "totals.gross": 1,
            })
            .build();

        let records: Vec<RollupRecord> = self
            .db
            .collection::<RollupRecord>("invoices")
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(records
            .into_iter()
            .map(|record| InvoiceRollup {
                customer_id: record.customer_id,
                status: record.status,
                issue_date: record.issue_date,
                due_date: record.due_date,
                gross: record.totals.gross,
            })
            .collect())
    }
}
