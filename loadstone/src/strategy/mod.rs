//! Per-kind load protocols and the timeout/cancellation race.
//!
//! Completion signals diverge by kind: elements settle through the
//! document's load/error events, JSON and binary resources through the
//! transport, fonts through the font subsystem. [`run`] drives the right
//! protocol and races it against one timer and the attempt's cancellation
//! token in a single `select!`; the first settlement wins and the losing
//! branches are dropped, so a late signal can never re-settle an attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::LoadError;
use crate::host::{
    DocumentHost, ElementSpec, ElementTag, FontFaceSpec, FontHost, InsertionPoint, Transport,
};
use crate::kind::ResourceKind;
use crate::options::CrossOrigin;
use crate::outcome::LoadedResource;

/// Family name under which font resources are loaded; hosts may alias it on
/// registration.
pub const FONT_FAMILY_PLACEHOLDER: &str = "customFont";

/// Collaborator handles shared by every attempt of one loader.
pub(crate) struct Hosts {
    pub(crate) document: Arc<dyn DocumentHost>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) fonts: Arc<dyn FontHost>,
}

/// Immutable snapshot of everything one attempt needs; taken from the
/// caller's configuration before the attempt starts.
pub(crate) struct LoadPlan {
    pub(crate) kind: ResourceKind,
    /// URL actually requested (after cache busting).
    pub(crate) final_url: String,
    /// Validated element attributes, in application order.
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) timeout: Duration,
    pub(crate) append_to_body: bool,
    pub(crate) cross_origin: Option<CrossOrigin>,
}

/// Drives one load attempt to a single settlement: success value, categorized
/// failure, timeout, or abort.
pub(crate) async fn run(
    hosts: Arc<Hosts>,
    plan: LoadPlan,
    cancel: CancellationToken,
) -> Result<LoadedResource, LoadError> {
    // A resource inserted outside the loader's control counts as loaded;
    // no element, no timer, no network.
    if plan.kind.is_element() && hosts.document.contains(&plan.final_url) {
        tracing::debug!(url = %plan.final_url, "element already attached, treating as loaded");
        return Ok(LoadedResource::AlreadyPresent);
    }

    let outcome = {
        let attempt = attempt(&hosts, &plan, &cancel);
        tokio::select! {
            _ = cancel.cancelled() => Err(LoadError::Aborted {
                url: plan.final_url.clone(),
            }),
            _ = tokio::time::sleep(plan.timeout) => Err(LoadError::Timeout {
                url: plan.final_url.clone(),
            }),
            settled = attempt => settled,
        }
    };

    match &outcome {
        Ok(_) => {
            tracing::debug!(url = %plan.final_url, kind = %plan.kind, "resource loaded");
        }
        Err(error) => {
            // A lost race leaves a partially-inserted element behind; an
            // element's own error signal does not.
            if plan.kind.is_element()
                && matches!(error, LoadError::Timeout { .. } | LoadError::Aborted { .. })
            {
                hosts.document.remove_matching(&plan.final_url);
            }
            tracing::warn!(url = %plan.final_url, error = %error, "failed to load resource");
        }
    }
    outcome
}

/// The kind-specific protocol, without timeout or cancellation concerns.
async fn attempt(
    hosts: &Hosts,
    plan: &LoadPlan,
    cancel: &CancellationToken,
) -> Result<LoadedResource, LoadError> {
    match plan.kind {
        ResourceKind::Script | ResourceKind::Stylesheet | ResourceKind::Image => {
            hosts
                .document
                .insert(element_spec(plan))
                .await
                .map(|_| LoadedResource::Element)
                .map_err(|raw| LoadError::categorize(&raw, Some(plan.kind), &plan.final_url))
        }
        ResourceKind::JsonDocument => {
            let body = hosts
                .transport
                .fetch(&plan.final_url, cancel)
                .await
                .map_err(|raw| LoadError::categorize(&raw, Some(plan.kind), &plan.final_url))?;
            let value = body
                .json()
                .map_err(|raw| LoadError::categorize(&raw, Some(plan.kind), &plan.final_url))?;
            Ok(LoadedResource::Json(Arc::new(value)))
        }
        ResourceKind::BinaryBlob => {
            let body = hosts
                .transport
                .fetch(&plan.final_url, cancel)
                .await
                .map_err(|raw| LoadError::categorize(&raw, Some(plan.kind), &plan.final_url))?;
            Ok(LoadedResource::Blob(Arc::new(body.into_bytes())))
        }
        ResourceKind::Font => {
            let spec = FontFaceSpec {
                family: FONT_FAMILY_PLACEHOLDER.to_string(),
                source_url: plan.final_url.clone(),
                cross_origin: plan.cross_origin,
            };
            let face = hosts
                .fonts
                .load(&spec)
                .await
                .map_err(|raw| LoadError::categorize(&raw, Some(plan.kind), &plan.final_url))?;
            hosts.fonts.register(face);
            Ok(LoadedResource::Font)
        }
    }
}

fn element_spec(plan: &LoadPlan) -> ElementSpec {
    let tag = match plan.kind {
        ResourceKind::Script => ElementTag::Script,
        ResourceKind::Stylesheet => ElementTag::Link,
        _ => ElementTag::Img,
    };
    let mut attributes = Vec::with_capacity(plan.attributes.len() + 1);
    // Structural attributes come first so caller-supplied ones can override.
    match plan.kind {
        ResourceKind::Script => attributes.push(("async".to_string(), "true".to_string())),
        ResourceKind::Stylesheet => {
            attributes.push(("rel".to_string(), "stylesheet".to_string()))
        }
        _ => {}
    }
    attributes.extend(plan.attributes.iter().cloned());
    let insertion_point = if plan.kind == ResourceKind::Script && plan.append_to_body {
        InsertionPoint::Body
    } else {
        InsertionPoint::Head
    };
    ElementSpec {
        tag,
        url: plan.final_url.clone(),
        attributes,
        insertion_point,
        cross_origin: plan.cross_origin,
    }
}
