//! Field validation rules applied before any persistence.
//!
//! All applicable rules run and their failures are aggregated into one
//! [`FieldErrors`] map, so a single response can report every problem at
//! once. Nested payload blocks contribute errors under dotted keys
//! (`identification.title`).

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::dto::{
    DataQualityPatch, DataQualityPayload, DistributionPatch, DistributionPayload,
    IdentificationPatch, IdentificationPayload, LineagePatch, LineagePayload, MetadataContactPatch,
    MetadataContactPayload, MetadataPatch, MetadataPayload, PointOfContactPatch,
    PointOfContactPayload, ReferenceSystemPayload, TemporalExtentPayload,
};
use crate::error::{FieldErrors, Result};

pub const METADATA_STATUSES: [&str; 3] = ["DRAFT", "PUBLISHED", "ARCHIVED"];
pub const SPATIAL_REP_TYPES: [&str; 2] = ["VECTOR", "RASTER"];
pub const CHARACTER_SETS: [&str; 4] = ["utf8", "utf16", "ascii", "iso-8859-1"];
pub const LANGUAGES: [&str; 3] = ["en", "fr", "es"];
pub const TOPIC_CATEGORIES: [&str; 19] = [
    "farming",
    "biota",
    "boundaries",
    "climatologyMeteorologyAtmosphere",
    "economy",
    "elevation",
    "environment",
    "geoscientificInformation",
    "health",
    "imageryBaseMapsEarthCover",
    "intelligenceMilitary",
    "inlandWaters",
    "location",
    "oceans",
    "planningCadastre",
    "society",
    "structure",
    "transportation",
    "utilitiesCommunication",
];

const BOUNDING_BOX_KEYS: [&str; 4] = ["north", "south", "east", "west"];

/// Standard email-address syntax check.
pub fn email_is_valid(value: &str) -> bool {
    let pattern = regex::Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid");
    pattern.is_match(value)
}

fn check_title(errors: &mut FieldErrors, key: &str, value: &str) {
    if value.len() < 3 {
        errors.push(key, "Title must be at least 3 characters long");
    }
}

fn check_abstract(errors: &mut FieldErrors, key: &str, value: &str) {
    if value.len() < 10 {
        errors.push(key, "Abstract must be at least 10 characters long");
    }
}

fn check_choice(errors: &mut FieldErrors, key: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        errors.push(key, format!("Must be one of: {}", allowed.join(", ")));
    }
}

/// Case-insensitive allow-list check for fields that are normalized to
/// lowercase before storage (character set, language).
fn check_normalized_choice(errors: &mut FieldErrors, key: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value.to_lowercase().as_str()) {
        errors.push(key, format!("Must be one of: {}", allowed.join(", ")));
    }
}

fn check_email(errors: &mut FieldErrors, key: &str, value: &str) {
    if !email_is_valid(value) {
        errors.push(key, "Enter a valid email address");
    }
}

fn check_not_future(errors: &mut FieldErrors, key: &str, value: &DateTime<Utc>) {
    if *value > Utc::now() {
        errors.push(key, "Date cannot be in the future");
    }
}

fn check_bounding_box(errors: &mut FieldErrors, key: &str, value: &Value) {
    let Some(map) = value.as_object() else {
        errors.push(key, "Must contain north, south, east, and west coordinates");
        return;
    };
    let missing = BOUNDING_BOX_KEYS.iter().any(|k| !map.contains_key(*k));
    let extra = map.keys().any(|k| !BOUNDING_BOX_KEYS.contains(&k.as_str()));
    if missing || extra {
        errors.push(
            key,
            "Must contain exactly north, south, east, and west coordinates",
        );
        return;
    }
    for k in BOUNDING_BOX_KEYS {
        if !map[k].is_number() {
            errors.push(key, format!("Coordinate '{k}' must be a number"));
        }
    }
}

fn check_keywords(errors: &mut FieldErrors, key: &str, value: &Value) {
    if !value.is_array() {
        errors.push(key, "Keywords must be a list");
    }
}

fn check_hierarchy_level(errors: &mut FieldErrors, key: &str, value: i64) {
    if value < 0 {
        errors.push(key, "Hierarchy level must be a non-negative integer");
    }
}

fn check_scale(errors: &mut FieldErrors, key: &str, value: f64) {
    if value <= 0.0 {
        errors.push(key, "Scale must be a positive number");
    }
}

// ---------------------------------------------------------------------------
// Create payload validation
// ---------------------------------------------------------------------------

/// Validate a full create payload, nested blocks included.
pub fn validate_metadata_payload(payload: &MetadataPayload) -> Result<()> {
    let mut errors = metadata_root_errors(
        payload.status.as_deref(),
        payload.language.as_deref(),
        payload.character_set.as_deref(),
    );

    if let Some(identification) = &payload.identification {
        errors.merge_prefixed("identification", identification_errors(identification));
    }
    if let Some(distribution) = &payload.distribution {
        errors.merge_prefixed("distribution", distribution_errors(distribution));
    }
    if let Some(lineage) = &payload.lineage {
        errors.merge_prefixed("lineage", lineage_errors(lineage));
    }
    if let Some(reference_system) = &payload.reference_system {
        errors.merge_prefixed("reference_system", reference_system_errors(reference_system));
    }
    if let Some(contact) = &payload.contact {
        errors.merge_prefixed("contact", metadata_contact_errors(contact));
    }
    if let Some(quality) = &payload.quality {
        errors.merge_prefixed("quality", quality_errors(quality));
    }

    errors.into_result()
}

fn metadata_root_errors(
    status: Option<&str>,
    language: Option<&str>,
    character_set: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(status) = status {
        check_choice(&mut errors, "status", status, &METADATA_STATUSES);
    }
    if let Some(language) = language {
        check_normalized_choice(&mut errors, "language", language, &LANGUAGES);
    }
    if let Some(character_set) = character_set {
        check_normalized_choice(&mut errors, "character_set", character_set, &CHARACTER_SETS);
    }
    errors
}

fn identification_errors(payload: &IdentificationPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_title(&mut errors, "title", &payload.title);
    check_abstract(&mut errors, "abstract", &payload.abstract_text);
    check_not_future(&mut errors, "production_date", &payload.production_date);
    if let Some(edition_date) = &payload.edition_date {
        check_not_future(&mut errors, "edition_date", edition_date);
    }
    check_choice(
        &mut errors,
        "spatial_rep_type",
        &payload.spatial_rep_type,
        &SPATIAL_REP_TYPES,
    );
    if let Some(scale) = payload.equivalent_scale {
        check_scale(&mut errors, "equivalent_scale", scale);
    }
    check_bounding_box(
        &mut errors,
        "geographic_bounding_box",
        &payload.geographic_bounding_box,
    );
    check_keywords(&mut errors, "keywords", &payload.keywords);
    if let Some(topic_category) = &payload.topic_category {
        check_choice(&mut errors, "topic_category", topic_category, &TOPIC_CATEGORIES);
    }

    if let Some(point_of_contact) = &payload.point_of_contact {
        errors.merge_prefixed("point_of_contact", point_of_contact_errors(point_of_contact));
    }
    if let Some(temporal_extent) = &payload.temporal_extent {
        errors.merge_prefixed("temporal_extent", temporal_extent_errors(temporal_extent));
    }
    errors
}

fn point_of_contact_errors(payload: &PointOfContactPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", &payload.email);
    errors
}

fn temporal_extent_errors(_payload: &TemporalExtentPayload) -> FieldErrors {
    // Extent dates may legitimately lie in the future (planned coverage).
    FieldErrors::new()
}

fn distribution_errors(payload: &DistributionPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(email) = &payload.distributor_email {
        check_email(&mut errors, "distributor_email", email);
    }
    errors
}

fn lineage_errors(payload: &LineagePayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_hierarchy_level(&mut errors, "hierarchy_level", payload.hierarchy_level);
    if let Some(process_date) = &payload.process_date {
        check_not_future(&mut errors, "process_date", process_date);
    }
    errors
}

fn reference_system_errors(_payload: &ReferenceSystemPayload) -> FieldErrors {
    FieldErrors::new()
}

fn metadata_contact_errors(payload: &MetadataContactPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", &payload.email);
    errors
}

fn quality_errors(payload: &DataQualityPayload) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(process_date) = &payload.process_date {
        check_not_future(&mut errors, "process_date", process_date);
    }
    errors
}

// ---------------------------------------------------------------------------
// Patch validation (rules apply only to fields present in the patch)
// ---------------------------------------------------------------------------

/// Validate a partial-update payload; fields left out of the patch are not
/// checked because they will not be touched.
pub fn validate_metadata_patch(patch: &MetadataPatch) -> Result<()> {
    let mut errors = metadata_root_errors(
        patch.status.as_deref(),
        patch.language.as_deref(),
        patch.character_set.as_deref(),
    );

    if let Some(identification) = &patch.identification {
        errors.merge_prefixed("identification", identification_patch_errors(identification));
    }
    if let Some(distribution) = &patch.distribution {
        errors.merge_prefixed("distribution", distribution_patch_errors(distribution));
    }
    if let Some(lineage) = &patch.lineage {
        errors.merge_prefixed("lineage", lineage_patch_errors(lineage));
    }
    if let Some(contact) = &patch.contact {
        errors.merge_prefixed("contact", metadata_contact_patch_errors(contact));
    }
    if let Some(quality) = &patch.quality {
        errors.merge_prefixed("quality", quality_patch_errors(quality));
    }

    errors.into_result()
}

fn identification_patch_errors(patch: &IdentificationPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(title) = &patch.title {
        check_title(&mut errors, "title", title);
    }
    if let Some(abstract_text) = &patch.abstract_text {
        check_abstract(&mut errors, "abstract", abstract_text);
    }
    if let Some(production_date) = &patch.production_date {
        check_not_future(&mut errors, "production_date", production_date);
    }
    if let Some(edition_date) = &patch.edition_date {
        check_not_future(&mut errors, "edition_date", edition_date);
    }
    if let Some(spatial_rep_type) = &patch.spatial_rep_type {
        check_choice(&mut errors, "spatial_rep_type", spatial_rep_type, &SPATIAL_REP_TYPES);
    }
    if let Some(scale) = patch.equivalent_scale {
        check_scale(&mut errors, "equivalent_scale", scale);
    }
    if let Some(bounding_box) = &patch.geographic_bounding_box {
        check_bounding_box(&mut errors, "geographic_bounding_box", bounding_box);
    }
    if let Some(keywords) = &patch.keywords {
        check_keywords(&mut errors, "keywords", keywords);
    }
    if let Some(topic_category) = &patch.topic_category {
        check_choice(&mut errors, "topic_category", topic_category, &TOPIC_CATEGORIES);
    }
    if let Some(point_of_contact) = &patch.point_of_contact {
        errors.merge_prefixed(
            "point_of_contact",
            point_of_contact_patch_errors(point_of_contact),
        );
    }
    errors
}

fn point_of_contact_patch_errors(patch: &PointOfContactPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(email) = &patch.email {
        check_email(&mut errors, "email", email);
    }
    errors
}

fn distribution_patch_errors(patch: &DistributionPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(email) = &patch.distributor_email {
        check_email(&mut errors, "distributor_email", email);
    }
    errors
}

fn lineage_patch_errors(patch: &LineagePatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(level) = patch.hierarchy_level {
        check_hierarchy_level(&mut errors, "hierarchy_level", level);
    }
    if let Some(process_date) = &patch.process_date {
        check_not_future(&mut errors, "process_date", process_date);
    }
    errors
}

fn metadata_contact_patch_errors(patch: &MetadataContactPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(email) = &patch.email {
        check_email(&mut errors, "email", email);
    }
    errors
}

fn quality_patch_errors(patch: &DataQualityPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(process_date) = &patch.process_date {
        check_not_future(&mut errors, "process_date", process_date);
    }
    errors
}
