//! Payload fixtures shared across integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn bounding_box() -> Value {
    json!({ "north": 90.0, "south": -90.0, "east": 180.0, "west": -180.0 })
}

/// An identification block with only its required fields.
pub fn identification_payload() -> Value {
    json!({
        "title": "Test Dataset",
        "production_date": "2020-06-01T00:00:00Z",
        "abstract": "A test dataset abstract",
        "spatial_rep_type": "VECTOR",
        "geographic_bounding_box": bounding_box()
    })
}

/// A root payload with no nested blocks.
pub fn minimal_metadata_payload() -> Value {
    json!({
        "status": "DRAFT",
        "metadata_linkage": "http://example.com",
        "metadata_standard": "ISO 19115"
    })
}

/// A payload exercising all nine sub-records.
pub fn full_metadata_payload() -> Value {
    json!({
        "status": "DRAFT",
        "metadata_linkage": "http://example.com/dataset",
        "metadata_standard": "ISO 19115",
        "language": "en",
        "character_set": "utf8",
        "identification": {
            "title": "National Land Cover 2020",
            "production_date": "2020-06-01T00:00:00Z",
            "edition_date": "2021-01-15T00:00:00Z",
            "abstract": "Land cover classification derived from satellite imagery",
            "spatial_rep_type": "RASTER",
            "equivalent_scale": 50000.0,
            "geographic_bounding_box": bounding_box(),
            "update_frequency": "annual",
            "keywords": ["land cover", "remote sensing"],
            "keyword_type": "theme",
            "topic_category": "environment",
            "point_of_contact": {
                "name": "Jane Analyst",
                "organization": "Geo Institute",
                "email": "jane@example.com",
                "phone": "+12025550100",
                "address": "1 Survey Way",
                "role": "custodian"
            },
            "constraints": {
                "access_constraints": "none",
                "use_constraints": "attribution required",
                "other_constraints": "none"
            },
            "temporal_extent": {
                "start_date": "2020-01-01T00:00:00Z",
                "end_date": "2020-12-31T00:00:00Z",
                "frequency": "annual"
            }
        },
        "distribution": {
            "name": "Geo Institute Downloads",
            "address": "1 Survey Way",
            "phone_no": "+12025550101",
            "weblink": "https://downloads.example.com",
            "format": "GeoTIFF",
            "distributor_email": "downloads@example.com",
            "order_process": "online"
        },
        "lineage": {
            "statement": "Classified from Sentinel-2 scenes",
            "hierarchy_level": 2,
            "process_software": "gdal 3.8",
            "process_date": "2020-11-01T00:00:00Z"
        },
        "reference_system": {
            "identifier": "EPSG",
            "code": "4326"
        },
        "contact": {
            "name": "Records Office",
            "organization": "Geo Institute",
            "email": "records@example.com",
            "role": "publisher",
            "weblink": "https://example.com/records"
        },
        "quality": {
            "completeness_report": "98% of tiles classified",
            "accuracy_report": "Overall accuracy 91%",
            "process_description": "Stratified random sample verification",
            "process_date": "2021-02-01T00:00:00Z"
        }
    })
}
