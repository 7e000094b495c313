//! Generación de referencias legibles (tracking de colis, número de bon)

use chrono::NaiveDate;
use uuid::Uuid;

/// `COL-YYYYMMDD-XXXXXXXX` con 8 hex en mayúsculas
pub fn tracking_number(date: NaiveDate) -> String {
    format!("COL-{}-{}", date.format("%Y%m%d"), random_suffix(8))
}

/// `BON-YYYYMMDD-XXXXXX` con 6 hex en mayúsculas
pub fn bon_number(date: NaiveDate) -> String {
    format!("BON-{}-{}", date.format("%Y%m%d"), random_suffix(6))
}

fn random_suffix(len: usize) -> String {
    Uuid::new_v4().simple().to_string()[..len].to_uppercase()
}
