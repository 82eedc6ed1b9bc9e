//! Storage key naming.
//!
//! Keys are `{folder}/{timestamp_ms}-{random hex}{ext}`, grouping uploads by
//! purpose and owner:
//!
//! - `customer-photos/{customer}/...`
//! - `clothing-images/{category}/...`
//! - `fitting-results/{customer}/...`
//! - `sample_clothes/...` (catalog, seeded out-of-band)

use chrono::Utc;
use rand::Rng;
use std::path::Path;

/// Prefix identifying catalog clothing keys. A clothing reference starting
/// with this prefix is resolved against the catalog, not the uploads table.
pub const SAMPLE_CLOTHES_PREFIX: &str = "sample_clothes/";

/// Generate a unique storage key for an upload.
///
/// The original filename contributes only its extension; the rest is a
/// millisecond timestamp plus 8 random bytes in hex, which keeps keys
/// unique without coordination.
pub fn unique_key(folder: &str, original_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: u64 = rand::rng().random();
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let folder = folder.trim_end_matches('/');
    format!("{folder}/{timestamp}-{random:016x}{ext}")
}

/// Key folder for a customer's own photos.
pub fn customer_photo_folder(customer_ref: &str) -> String {
    format!("customer-photos/{customer_ref}")
}

/// Key folder for uploaded clothing images, grouped by category.
pub fn clothing_image_folder(category: &str) -> String {
    format!("clothing-images/{category}")
}

/// Key folder for synthesis results, grouped by customer.
pub fn fitting_result_folder(customer_ref: &str) -> String {
    format!("fitting-results/{customer_ref}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_keep_folder_and_extension() {
        let key = unique_key("customer-photos/42", "selfie.JPG");
        assert!(key.starts_with("customer-photos/42/"));
        assert!(key.ends_with(".JPG"));
    }

    #[test]
    fn keys_without_extension_are_allowed() {
        let key = unique_key("fitting-results/7", "result");
        assert!(key.starts_with("fitting-results/7/"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn keys_are_unique_across_calls() {
        let a = unique_key("clothing-images/top", "a.png");
        let b = unique_key("clothing-images/top", "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn folder_helpers() {
        assert_eq!(customer_photo_folder("42"), "customer-photos/42");
        assert_eq!(clothing_image_folder("dress"), "clothing-images/dress");
        assert_eq!(fitting_result_folder("42"), "fitting-results/42");
    }
}
