use invoicing_service::models::{
    CreateCustomer, CreateInvoice, CreatePayment, InvoiceStatus, LineItem,
};
use invoicing_service::services::{
    CustomerService, InMemoryStore, InvoiceService, PaymentService, Reconciler, Reconciliation,
};
use rust_decimal::Decimal;
use std::sync::Arc;

const ROUNDS: usize = 25;
const PAYMENTS_PER_INVOICE: usize = 10;

fn flat_fee(amount: Decimal) -> LineItem {
    LineItem {
        product_id: None,
        name: "Flat fee".to_string(),
        quantity: Decimal::ONE,
        unit_price: amount,
        tax_rate: Decimal::ZERO,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_payments_converge_to_paid() {
    let store = Arc::new(InMemoryStore::new());
    let reconciler = Reconciler::new(store.clone());
    let customers = CustomerService::new(store.clone());
    let invoices = InvoiceService::new(store.clone(), reconciler.clone(), "EUR".to_string());
    let payments = PaymentService::new(store.clone(), reconciler.clone());

    let customer = customers
        .create(CreateCustomer {
            name: "Wayne Enterprises".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let instalment = Decimal::new(1000, 2);
    let gross = instalment * Decimal::from(PAYMENTS_PER_INVOICE as i64);

    for round in 0..ROUNDS {
        let invoice = invoices
            .create(CreateInvoice {
                customer_id: Some(customer.id.clone()),
                status: Some(InvoiceStatus::Sent),
                items: vec![flat_fee(gross)],
                ..Default::default()
            })
            .await
            .unwrap();

        let handles: Vec<_> = (0..PAYMENTS_PER_INVOICE)
            .map(|_| {
                let payments = payments.clone();
                let invoice_id = invoice.id.clone();
                tokio::spawn(async move {
                    payments
                        .create(CreatePayment {
                            invoice_id: Some(invoice_id),
                            amount: Some(instalment),
                            ..Default::default()
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = invoices.get(&invoice.id).await.unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid, "round {} left a stale status", round);
        assert_eq!(
            reconciler.reconcile(&invoice.id).await.unwrap(),
            Reconciliation::Unchanged(InvoiceStatus::Paid)
        );
    }
}
