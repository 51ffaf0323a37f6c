//! Label and UI string endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::catalog::Locale;
use crate::server::error::ApiError;
use crate::server::state::SharedState;

#[derive(Debug, Serialize)]
pub struct LabelEntry {
    pub index: usize,
    pub label: String,
    pub display_name: String,
    pub plant: String,
    pub healthy: bool,
    pub has_content: bool,
}

#[derive(Debug, Serialize)]
pub struct LabelsResponse {
    pub count: usize,
    pub labels: Vec<LabelEntry>,
}

/// GET /labels - Labels in model output order
pub async fn list_labels(State(state): State<SharedState>) -> Json<LabelsResponse> {
    let diagnoser = &state.diagnoser;
    let labels: Vec<LabelEntry> = diagnoser
        .labels()
        .iter()
        .enumerate()
        .map(|(index, label)| LabelEntry {
            index,
            label: label.to_string(),
            display_name: label.display_name(),
            plant: label.plant().to_string(),
            healthy: label.is_healthy(),
            has_content: diagnoser.content().has_label(label),
        })
        .collect();

    Json(LabelsResponse {
        count: labels.len(),
        labels,
    })
}

#[derive(Debug, Serialize)]
pub struct LocaleEntry {
    pub code: &'static str,
    pub native_name: &'static str,
    pub records: usize,
}

/// GET /locales - Supported locales with content coverage
pub async fn list_locales(State(state): State<SharedState>) -> Json<Vec<LocaleEntry>> {
    let entries = state
        .diagnoser
        .content()
        .coverage()
        .into_iter()
        .map(|(locale, records)| LocaleEntry {
            code: locale.code(),
            native_name: locale.native_name(),
            records,
        })
        .collect();
    Json(entries)
}

#[derive(Debug, Serialize)]
pub struct UiStringsResponse {
    pub locale: &'static str,
    pub native_name: &'static str,
    pub strings: BTreeMap<&'static str, String>,
}

/// GET /locales/:locale/strings - UI strings for one locale
pub async fn locale_strings(
    State(state): State<SharedState>,
    Path(locale): Path<String>,
) -> Result<Json<UiStringsResponse>, ApiError> {
    let locale: Locale = locale.parse()?;
    let strings = state
        .diagnoser
        .ui(locale)
        .entries()
        .map(|(key, text)| (key.as_str(), text.to_string()))
        .collect();

    Ok(Json(UiStringsResponse {
        locale: locale.code(),
        native_name: locale.native_name(),
        strings,
    }))
}
