//! # Evaluate Subcommand
//!
//! Runs a scenario file through the persona session, escrow ledger, gate,
//! and obfuscator, and prints what the viewer would get.
//!
//! ```json
//! {
//!   "now": "2026-03-04T10:00:00Z",
//!   "session": { "identityId": "…", "activeRole": "consumer", "unlockedRoles": ["consumer"] },
//!   "identity": { "id": "…", "institution": "University of Jos", "matricNumber": "UJ/21/0042" },
//!   "escrow": { "amount": 75000, "events": ["fundsCommitted"], "at": "2026-03-01T09:00:00Z" },
//!   "coordinate": { "lat": 9.8862, "lng": 8.8884 }
//! }
//! ```
//!
//! Every field is optional. No session means a guest. Escrow events are
//! applied at `escrow.at` (default `now`) and the result is read at `now`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

use trustgate_core::{
    CounterpartyId, GeoCoordinate, Identity, ResourceId, Timestamp, TrustGateConfig, ViewerId,
};
use trustgate_escrow::{EscrowEvent, EscrowLedger, EscrowTransaction, FeeRate, FeeSplit};
use trustgate_gate::{resolve_location, AccessDecision, VisibilityGate};
use trustgate_geo::{GeoError, GeoPrivacyObfuscator, MapView};
use trustgate_state::{PersistedSession, Session};

/// Arguments for the evaluate subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to a scenario JSON file.
    #[arg(long)]
    pub scenario: PathBuf,

    /// Seed for the obfuscation RNG, for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Scenario input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    pub now: Option<Timestamp>,
    pub session: Option<PersistedSession>,
    pub identity: Option<Identity>,
    pub escrow: Option<EscrowScenario>,
    pub coordinate: Option<GeoCoordinate>,
    pub viewer_id: Option<ViewerId>,
    pub resource_id: Option<ResourceId>,
}

/// Escrow history to replay.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EscrowScenario {
    pub amount: u64,
    pub fee_bps: Option<u32>,
    #[serde(default)]
    pub events: Vec<EscrowEvent>,
    pub at: Option<Timestamp>,
}

/// What the scenario resolves to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub decision: AccessDecision,
    pub map_view: Option<MapView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_split: Option<FeeSplit>,
}

pub fn run(args: &EvaluateArgs, config: &TrustGateConfig) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .with_context(|| format!("parsing scenario {}", args.scenario.display()))?;
    let obfuscator = match args.seed {
        Some(seed) => GeoPrivacyObfuscator::with_seed(config.geo.clone(), seed)?,
        None => GeoPrivacyObfuscator::new(config.geo.clone())?,
    };
    let report = evaluate(&scenario, config, &obfuscator)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Evaluate a parsed scenario.
pub fn evaluate(
    scenario: &Scenario,
    config: &TrustGateConfig,
    obfuscator: &GeoPrivacyObfuscator,
) -> anyhow::Result<EvaluationReport> {
    let now = scenario.now.unwrap_or_else(Timestamp::now);
    let session = match &scenario.session {
        Some(snapshot) => Session::from_persisted(snapshot).context("restoring session")?,
        None => Session::guest(),
    };
    let escrow = scenario
        .escrow
        .as_ref()
        .map(|e| replay_escrow(e, config, now))
        .transpose()?;

    let gate = VisibilityGate::new(&session, scenario.identity.as_ref(), now);
    let decision = AccessDecision::evaluate(&gate, escrow.as_ref());

    let viewer = scenario
        .viewer_id
        .or_else(|| session.identity().map(ViewerId::from))
        .unwrap_or_default();
    let resource = scenario.resource_id.unwrap_or_default();
    let (map_view, location_error) = match resolve_location(
        &gate,
        obfuscator,
        viewer,
        resource,
        scenario.coordinate,
        escrow.as_ref(),
    ) {
        Ok(view) => (Some(view), None),
        Err(e @ GeoError::LocationUnavailable { .. }) => (None, Some(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    Ok(EvaluationReport {
        decision,
        map_view,
        location_error,
        fee_split: escrow.as_ref().map(EscrowTransaction::fee_split),
    })
}

fn replay_escrow(
    history: &EscrowScenario,
    config: &TrustGateConfig,
    now: Timestamp,
) -> anyhow::Result<EscrowTransaction> {
    let ledger = EscrowLedger::new(&config.escrow)?;
    if let Some(bps) = history.fee_bps {
        ledger.set_default_fee_rate(FeeRate::new(bps)?);
    }
    let at = history.at.unwrap_or(now);
    let tx = ledger.open(history.amount, CounterpartyId::new(), at)?;
    for event in &history.events {
        ledger
            .apply(tx.id(), *event, at)
            .with_context(|| format!("replaying escrow event {event}"))?;
    }
    Ok(ledger.get(tx.id(), now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use trustgate_escrow::EscrowStatus;

    const IDENTITY: &str = "0f8e5c1a-3b7d-4e2f-9a6c-1d2b3c4d5e6f";

    fn obfuscator() -> GeoPrivacyObfuscator {
        GeoPrivacyObfuscator::with_seed(TrustGateConfig::default().geo, 1).unwrap()
    }

    fn parse(json: &str) -> Scenario {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_scenario_is_guest_without_location() {
        let report = evaluate(&Scenario::default(), &TrustGateConfig::default(), &obfuscator()).unwrap();
        assert!(report.decision.is_guest);
        assert!(report.map_view.is_none());
        assert!(report.location_error.is_some());
    }

    #[test]
    fn paid_consumer_gets_exact_view() {
        let scenario = parse(&format!(
            r#"{{
                "session": {{ "identityId": "{IDENTITY}", "activeRole": "consumer", "unlockedRoles": ["consumer"] }},
                "escrow": {{ "amount": 75000, "events": ["fundsCommitted"] }},
                "coordinate": {{ "lat": 9.8862, "lng": 8.8884 }}
            }}"#
        ));
        let report = evaluate(&scenario, &TrustGateConfig::default(), &obfuscator()).unwrap();
        assert!(report.decision.show_precise_location);
        let view = report.map_view.unwrap();
        assert!(view.marker_visible);
        assert_eq!(view.zoom_ceiling, 20);
        assert_eq!(report.fee_split.unwrap().net, 66_000);
    }

    #[test]
    fn elapsed_window_reads_released() {
        let scenario = parse(&format!(
            r#"{{
                "now": "2026-03-05T10:00:00Z",
                "session": {{ "identityId": "{IDENTITY}", "activeRole": "consumer", "unlockedRoles": ["consumer"] }},
                "escrow": {{
                    "amount": 45000,
                    "events": ["fundsCommitted", "deliveryOrMoveInConfirmed"],
                    "at": "2026-03-01T09:00:00Z"
                }}
            }}"#
        ));
        let report = evaluate(&scenario, &TrustGateConfig::default(), &obfuscator()).unwrap();
        assert_eq!(report.decision.escrow_status, Some(EscrowStatus::Released));
    }

    #[test]
    fn invalid_event_sequence_is_error() {
        let scenario = parse(r#"{ "escrow": { "amount": 100, "events": ["counterpartyConfirmsOrDeadlinePasses"] } }"#);
        assert!(evaluate(&scenario, &TrustGateConfig::default(), &obfuscator()).is_err());
    }

    #[test]
    fn corrupt_session_is_error() {
        let scenario = parse(&format!(
            r#"{{ "session": {{ "identityId": "{IDENTITY}", "activeRole": "admin", "unlockedRoles": ["consumer"] }} }}"#
        ));
        assert!(evaluate(&scenario, &TrustGateConfig::default(), &obfuscator()).is_err());
    }

    #[test]
    fn run_reads_file_and_prints_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "coordinate": {{ "lat": 9.8862, "lng": 8.8884 }} }}"#).unwrap();
        let args = EvaluateArgs {
            scenario: file.path().to_path_buf(),
            seed: Some(9),
        };
        let out = run(&args, &TrustGateConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["decision"]["isGuest"], true);
        assert_eq!(json["mapView"]["markerVisible"], false);
        assert_eq!(json["mapView"]["zoomCeiling"], 14);
    }
}
