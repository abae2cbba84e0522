use super::*;
use crate::types::VariantsResponse;

fn parse(json: &serde_json::Value) -> VariantsResult {
    serde_json::from_value::<VariantsResponse>(json.clone())
        .expect("fixture deserializes")
        .result
}

// -----------------------------------------------------------------------
// normalize_variants
// -----------------------------------------------------------------------

#[test]
fn joins_stock_and_price_maps_by_l2_id() {
    let result = parse(&serde_json::json!({
        "result": {
            "l2s": [
                {"l2Id": "a", "communicationCode": "474479-09-004", "color": {"code": "COL09"}, "size": {"code": "SMA004"}},
                {"l2Id": "b", "communicationCode": "474479-69-005", "color": {"code": "COL69"}, "size": {"code": "SMA005"}}
            ],
            "stocks": {"a": {"statusCode": "IN_STOCK"}, "b": {"statusCode": "STOCK_OUT"}},
            "prices": {"a": {"base": {"value": 2990}}, "b": {"base": {"value": 2990.0}}}
        }
    }));

    let variants = normalize_variants("474479", &result).unwrap();
    assert_eq!(variants.len(), 2);

    let first = &variants[0];
    assert_eq!(first.serial, "474479");
    assert_eq!(first.alt_serial, "474479");
    assert_eq!(first.variant_id, "a");
    assert_eq!(first.color, "Black 黑");
    assert_eq!(first.size, "M");
    assert_eq!(first.stock_status, StockStatus::InStock);
    assert_eq!(first.price, 2990);

    assert_eq!(variants[1].color, "Navy 海軍藍");
    assert_eq!(variants[1].size, "L");
    assert_eq!(variants[1].stock_status, StockStatus::StockOut);
}

#[test]
fn missing_stock_and_price_entries_use_fallbacks() {
    let result = parse(&serde_json::json!({
        "result": {
            "l2s": [
                {"l2Id": "x", "communicationCode": "123", "color": {"code": "COLZZ"}, "size": {"code": "SMA999"}}
            ]
        }
    }));

    let variants = normalize_variants("123456", &result).unwrap();
    let v = &variants[0];
    assert_eq!(v.stock_status, StockStatus::Unknown);
    assert_eq!(v.price, 0);
    assert_eq!(v.alt_serial, "123", "short communication codes are kept whole");
    assert_eq!(v.color, "Others 其他");
    assert_eq!(v.size, "");
}

#[test]
fn fractional_prices_round_to_whole_yen() {
    let result = parse(&serde_json::json!({
        "result": {
            "l2s": [{"l2Id": "a", "communicationCode": "474479", "color": {"code": "COL00"}, "size": {"code": "SMA003"}}],
            "prices": {"a": {"base": {"value": 1989.6}}}
        }
    }));
    assert_eq!(normalize_variants("474479", &result).unwrap()[0].price, 1990);
}

#[test]
fn empty_l2_id_is_a_normalization_error() {
    let result = parse(&serde_json::json!({
        "result": {
            "l2s": [{"l2Id": "", "communicationCode": "474479", "color": {"code": "COL00"}, "size": {"code": "SMA003"}}]
        }
    }));
    let err = normalize_variants("474479", &result).unwrap_err();
    assert!(
        matches!(err, ScraperError::Normalization { ref serial, .. } if serial == "474479"),
        "got: {err:?}"
    );
}

#[test]
fn empty_l2s_yields_no_variants() {
    let result = parse(&serde_json::json!({"result": {"l2s": []}}));
    assert!(normalize_variants("474479", &result).unwrap().is_empty());
}

// -----------------------------------------------------------------------
// serial_from_product_id
// -----------------------------------------------------------------------

#[test]
fn serial_is_taken_from_offsets_one_to_seven() {
    assert_eq!(serial_from_product_id("E474479-000").unwrap(), "474479");
    assert_eq!(serial_from_product_id("E4744790").unwrap(), "474479");
}

#[test]
fn short_product_id_is_rejected() {
    assert!(matches!(
        serial_from_product_id("E4744"),
        Err(ScraperError::Normalization { .. })
    ));
}
