//! Domain models - shipment and export records plus their caches
//!
//! Records are immutable once fetched; `update()` replaces a cache
//! wholesale, preserving the API's ordering. Display projections are
//! fixed six-column slices of each record, with missing fields kept as
//! `None` placeholders rather than errors.

use serde::Deserialize;

use crate::api::{ApiClient, RequestError};

/// One projected table row; `None` marks a field the API omitted
pub type DisplayRow = [Option<String>; 6];

/// Column headings for the current shipments table
pub const SHIPMENT_HEADINGS: [&str; 6] = [
    "Shipment Order",
    "Destination",
    "Package Count",
    "Weight (Kg)",
    "Value",
    "Order Number",
];

/// Column headings for the shipment exports table
pub const EXPORT_HEADINGS: [&str; 6] = [
    "Shipment Orders",
    "Destinations",
    "Shipment Count",
    "Package Count",
    "Created At",
    "Order Numbers",
];

/// A currently open shipment, as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub description: Option<String>,
    pub order_number: Option<String>,
    pub destination: Option<String>,
    pub package_count: Option<i64>,
    pub weight: Option<f64>,
    pub value: Option<f64>,
}

/// A server-side batch of closed shipments
#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    pub id: i64,
    pub description: Option<String>,
    pub order_numbers: Option<String>,
    pub destinations: Option<String>,
    pub package_count: Option<i64>,
    pub shipment_count: Option<i64>,
    pub created_at: Option<String>,
}

/// Cache of currently open shipments
#[derive(Debug, Default)]
pub struct CurrentShipments {
    pub shipments: Vec<Shipment>,
}

impl CurrentShipments {
    /// Fetch open shipments from the server, replacing the cache wholesale
    pub fn update(&mut self, api: &ApiClient) -> Result<(), RequestError> {
        self.shipments = api.current_shipments()?;
        Ok(())
    }

    /// Project the cached shipments into fixed-order table rows
    ///
    /// Columns: description, destination, package count, weight, value,
    /// order number.
    pub fn get_display_rows(&self) -> Vec<DisplayRow> {
        self.shipments
            .iter()
            .map(|shipment| {
                [
                    shipment.description.clone(),
                    shipment.destination.clone(),
                    shipment.package_count.map(|n| n.to_string()),
                    shipment.weight.map(|n| n.to_string()),
                    shipment.value.map(|n| n.to_string()),
                    shipment.order_number.clone(),
                ]
            })
            .collect()
    }

    /// Close the open shipments tied to `shipment_id`
    ///
    /// Returns the id of the export created server-side; the cache is
    /// untouched and must be re-fetched to observe the closure.
    pub fn close_shipment(&self, api: &ApiClient, shipment_id: i64) -> Result<i64, RequestError> {
        api.close_shipment(shipment_id)
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }
}

/// Cache of recent shipment exports
#[derive(Debug, Default)]
pub struct ShipmentExports {
    pub exports: Vec<Export>,
}

impl ShipmentExports {
    /// Fetch recent exports from the server, replacing the cache wholesale
    pub fn update(&mut self, api: &ApiClient) -> Result<(), RequestError> {
        self.exports = api.shipment_exports()?;
        Ok(())
    }

    /// Project the cached exports into fixed-order table rows
    ///
    /// Columns: description, destinations, shipment count, package
    /// count, created at, order numbers.
    pub fn get_display_rows(&self) -> Vec<DisplayRow> {
        self.exports
            .iter()
            .map(|export| {
                [
                    export.description.clone(),
                    export.destinations.clone(),
                    export.shipment_count.map(|n| n.to_string()),
                    export.package_count.map(|n| n.to_string()),
                    export.created_at.clone(),
                    export.order_numbers.clone(),
                ]
            })
            .collect()
    }

    /// Export at the given table index
    pub fn get(&self, index: usize) -> Option<&Export> {
        self.exports.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment_json() -> serde_json::Value {
        serde_json::json!({
            "id": 154,
            "description": "shipment description text",
            "order_number": "AAA1554",
            "destination": "shipment destination",
            "package_count": 5,
            "weight": 250,
            "value": 17.5,
        })
    }

    #[test]
    fn test_shipment_display_rows_fixed_order() {
        let shipment: Shipment = serde_json::from_value(shipment_json()).unwrap();
        let model = CurrentShipments {
            shipments: vec![shipment],
        };
        let rows = model.get_display_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            [
                Some(String::from("shipment description text")),
                Some(String::from("shipment destination")),
                Some(String::from("5")),
                Some(String::from("250")),
                Some(String::from("17.5")),
                Some(String::from("AAA1554")),
            ]
        );
    }

    #[test]
    fn test_shipment_missing_fields_become_none() {
        let shipment: Shipment =
            serde_json::from_value(serde_json::json!({"id": 1, "description": "only"})).unwrap();
        let model = CurrentShipments {
            shipments: vec![shipment],
        };
        let rows = model.get_display_rows();
        assert_eq!(rows[0][0], Some(String::from("only")));
        for cell in &rows[0][1..] {
            assert_eq!(*cell, None);
        }
    }

    #[test]
    fn test_numeric_fields_outside_i64_range_render_in_full() {
        let shipment: Shipment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "weight": 1e19,
            "value": 2.5,
        }))
        .unwrap();
        let model = CurrentShipments {
            shipments: vec![shipment],
        };
        let rows = model.get_display_rows();
        assert_eq!(rows[0][3], Some(String::from("10000000000000000000")));
        assert_eq!(rows[0][4], Some(String::from("2.5")));
    }

    #[test]
    fn test_one_row_per_shipment_in_api_order() {
        let shipments: Vec<Shipment> = (0..4)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "id": i,
                    "order_number": format!("ORD{}", i),
                }))
                .unwrap()
            })
            .collect();
        let model = CurrentShipments { shipments };
        let rows = model.get_display_rows();
        assert_eq!(rows.len(), 4);
        let orders: Vec<_> = rows.iter().map(|r| r[5].clone().unwrap()).collect();
        assert_eq!(orders, vec!["ORD0", "ORD1", "ORD2", "ORD3"]);
    }

    #[test]
    fn test_export_display_rows_fixed_order() {
        let export: Export = serde_json::from_value(serde_json::json!({
            "id": 132,
            "description": "Export 132",
            "order_numbers": "AAA1, BBB2",
            "destinations": "GB, DE",
            "package_count": 12,
            "shipment_count": 2,
            "created_at": "2024-03-01 10:15",
        }))
        .unwrap();
        let model = ShipmentExports {
            exports: vec![export],
        };
        let rows = model.get_display_rows();
        assert_eq!(
            rows[0],
            [
                Some(String::from("Export 132")),
                Some(String::from("GB, DE")),
                Some(String::from("2")),
                Some(String::from("12")),
                Some(String::from("2024-03-01 10:15")),
                Some(String::from("AAA1, BBB2")),
            ]
        );
    }

    #[test]
    fn test_export_get_by_index() {
        let export: Export = serde_json::from_value(serde_json::json!({"id": 9})).unwrap();
        let model = ShipmentExports {
            exports: vec![export],
        };
        assert_eq!(model.get(0).map(|e| e.id), Some(9));
        assert!(model.get(1).is_none());
    }
}
