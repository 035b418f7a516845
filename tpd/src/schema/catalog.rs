//! The two concrete requirement schemas the assistant gathers

use serde_json::Value;

use crate::schema::{CrossRule, FieldKind, FieldSpec, RequirementSchema};

/// Requirements for searching a bookable stay in a known location.
pub fn stay_booking() -> RequirementSchema {
    RequirementSchema {
        name: "stay_booking",
        version: 1,
        fields: vec![
            FieldSpec {
                name: "location",
                kind: FieldKind::Text { min_length: Some(1) },
                description: "The city, town, or area where the user wants to stay.",
                default: None,
            },
            FieldSpec {
                name: "check_in_date",
                kind: FieldKind::Date,
                description: "The date the user checks in.",
                default: None,
            },
            FieldSpec {
                name: "check_out_date",
                kind: FieldKind::Date,
                description: "The date the user checks out.",
                default: None,
            },
            FieldSpec {
                name: "number_of_adults",
                kind: FieldKind::Integer { gt: Some(0), ge: None },
                description: "How many adults are staying.",
                default: None,
            },
            FieldSpec {
                name: "number_of_children",
                kind: FieldKind::Integer { gt: None, ge: Some(1) },
                description: "How many children are accompanying.",
                default: Some(Value::from(1)),
            },
            FieldSpec {
                name: "budget_per_night",
                kind: FieldKind::Float { gt: Some(0.0) },
                description: "The budget per night for the stay, in INR.",
                default: None,
            },
            FieldSpec {
                name: "reasoning",
                kind: FieldKind::Text { min_length: None },
                description: "Your reasoning behind the extracted values.",
                default: Some(Value::from("")),
            },
        ],
        cross_rules: vec![CrossRule::DateOrder {
            earlier: "check_in_date",
            later: "check_out_date",
        }],
    }
}

/// Requirements for recommending destinations to a traveller who has not
/// picked one yet.
pub fn destination_recommendation() -> RequirementSchema {
    RequirementSchema {
        name: "destination_recommendation",
        version: 1,
        fields: vec![
            FieldSpec {
                name: "purpose",
                kind: FieldKind::Text { min_length: Some(1) },
                description: "The purpose of the trip, such as leisure, adventure, or a honeymoon.",
                default: Some(Value::from("leisure")),
            },
            FieldSpec {
                name: "travel_start_date",
                kind: FieldKind::Date,
                description: "The date the trip starts.",
                default: None,
            },
            FieldSpec {
                name: "travel_end_date",
                kind: FieldKind::Date,
                description: "The date the trip ends.",
                default: None,
            },
            FieldSpec {
                name: "budget",
                kind: FieldKind::Float { gt: Some(0.0) },
                description: "The total budget for the trip, in INR.",
                default: None,
            },
            FieldSpec {
                name: "number_of_travellers",
                kind: FieldKind::Integer { gt: Some(0), ge: None },
                description: "How many people are travelling together.",
                default: None,
            },
            FieldSpec {
                name: "nationality",
                kind: FieldKind::Text { min_length: Some(1) },
                description: "The nationality of the travellers, used for visa requirements.",
                default: Some(Value::from("Indian")),
            },
            FieldSpec {
                name: "reasoning",
                kind: FieldKind::Text { min_length: None },
                description: "Your reasoning behind the extracted values.",
                default: Some(Value::from("")),
            },
        ],
        cross_rules: vec![CrossRule::DateOrder {
            earlier: "travel_start_date",
            later: "travel_end_date",
        }],
    }
}
