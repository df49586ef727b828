//! Pure billing rules: document totals, document numbers and settlement
//! status. Nothing in here touches the store.

pub mod calculator;
pub mod numbering;
pub mod settlement;

pub use calculator::{calc_document_totals, calc_line_total, round_money};
pub use numbering::{format_document_number, DocumentKind};
pub use settlement::{derive_settlement_status, SettlementInput};
