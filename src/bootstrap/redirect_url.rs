//! Usage: Build the final redirect URL from an attribution result.
//!
//! Query parameter order is part of the contract with the receiving attribution endpoint:
//! - organic: existing destination query, then `idfa`, `bundle`, `onesignal_id`
//! - non-organic: attribution parameters (key order, minus `sub_id_2`), then `bundle`, `idfa`,
//!   `onesignal_id`

use super::types::AttributionResult;

const PARAM_SUB_ID_2: &str = "sub_id_2";
const PARAM_BUNDLE: &str = "bundle";
const PARAM_IDFA: &str = "idfa";
const PARAM_ONESIGNAL_ID: &str = "onesignal_id";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn build(
    attribution: &AttributionResult,
    tracking_id: Option<&str>,
    bundle_id: &str,
    correlation_id: Option<&str>,
) -> Option<reqwest::Url> {
    let tracking_id = non_blank(tracking_id);
    let correlation_id = non_blank(correlation_id);
    if correlation_id.is_none() {
        tracing::info!("correlation id unavailable; redirect URL built without onesignal_id");
    }

    if attribution.is_organic {
        build_organic(attribution, tracking_id, bundle_id, correlation_id)
    } else {
        build_attributed(attribution, tracking_id, bundle_id, correlation_id)
    }
}

fn build_organic(
    attribution: &AttributionResult,
    tracking_id: Option<&str>,
    bundle_id: &str,
    correlation_id: Option<&str>,
) -> Option<reqwest::Url> {
    let mut url = attribution.destination_url.clone();
    if url.cannot_be_a_base() {
        tracing::warn!(url = %url, "organic destination is not a hierarchical URL");
        return None;
    }

    {
        let mut query = url.query_pairs_mut();
        if let Some(idfa) = tracking_id {
            query.append_pair(PARAM_IDFA, idfa);
        }
        query.append_pair(PARAM_BUNDLE, bundle_id);
        if let Some(id) = correlation_id {
            query.append_pair(PARAM_ONESIGNAL_ID, id);
        }
    }
    Some(url)
}

fn build_attributed(
    attribution: &AttributionResult,
    tracking_id: Option<&str>,
    bundle_id: &str,
    correlation_id: Option<&str>,
) -> Option<reqwest::Url> {
    let mut url = attribution.destination_url.clone();
    if url.cannot_be_a_base() {
        tracing::warn!(url = %url, "attributed destination is not a hierarchical URL");
        return None;
    }

    // `sub_id_2` is path text, so any `/` inside it adds segments.
    if let Some(sub_id_2) = attribution.parameters.get(PARAM_SUB_ID_2) {
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}/{sub_id_2}"));
    }

    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in attribution
            .parameters
            .iter()
            .filter(|(key, _)| key.as_str() != PARAM_SUB_ID_2)
        {
            query.append_pair(key, value);
        }
        query.append_pair(PARAM_BUNDLE, bundle_id);
        if let Some(idfa) = tracking_id {
            query.append_pair(PARAM_IDFA, idfa);
        }
        if let Some(id) = correlation_id {
            query.append_pair(PARAM_ONESIGNAL_ID, id);
        }
    }
    Some(url)
}
