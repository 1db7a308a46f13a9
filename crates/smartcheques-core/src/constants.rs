//! ─── Tunable constants shared across subsystems ─────────────────────────────
//!
//! These are defaults; the layered configuration surface in `smartcheques-node`
//! overrides any of them per deployment.

// ── Asset Registry ───────────────────────────────────────────────────────────

/// Maximum decimal places a registered asset may declare.
pub const MAX_ASSET_DECIMALS: u8 = 18;

// ── Balance Ledger ───────────────────────────────────────────────────────────

/// Default transfer fee ceiling (inclusive), expressed as a fraction of amount.
pub const MAX_TRANSFER_FEE: f64 = 1.0;

// ── Oracle Registry & Cache ──────────────────────────────────────────────────

/// Default cache TTL for an oracle response.
pub const ORACLE_CACHE_TTL_SECS: i64 = 24 * 3600;

/// Rolling window (seconds) used to compute provider error rate.
pub const ORACLE_HEALTH_WINDOW_SECS: i64 = 3600;

/// Error rate at or above which a provider is considered unhealthy.
pub const ORACLE_UNHEALTHY_ERROR_RATE: f64 = 0.1;

/// Default per-provider rate limit when none is configured.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;
pub const DEFAULT_BURST_LIMIT: u32 = 10;

// ── Authorization Workflow ───────────────────────────────────────────────────

/// Risk score factor weights. Must sum to 1.0.
pub const RISK_WEIGHT_AMOUNT: f64 = 0.3;
pub const RISK_WEIGHT_TIME_OF_DAY: f64 = 0.2;
pub const RISK_WEIGHT_DESTINATION_NOVELTY: f64 = 0.3;
pub const RISK_WEIGHT_VELOCITY: f64 = 0.2;

/// Risk level band boundaries.
pub const RISK_LEVEL_LOW_MAX: f64 = 0.3;
pub const RISK_LEVEL_MODERATE_MAX: f64 = 0.6;
pub const RISK_LEVEL_HIGH_MAX: f64 = 0.8;

/// Default approval-tiering thresholds (minor units of the request's currency).
pub const DEFAULT_LOW_AMOUNT_THRESHOLD: &str = "1000";
pub const DEFAULT_MEDIUM_AMOUNT_THRESHOLD: &str = "10000";
pub const DEFAULT_HIGH_AMOUNT_THRESHOLD: &str = "100000";

/// Default required-approval counts per tier.
pub const DEFAULT_LOW_APPROVALS: u32 = 1;
pub const DEFAULT_MEDIUM_APPROVALS: u32 = 2;
pub const DEFAULT_HIGH_APPROVALS: u32 = 3;

/// Risk score at/above which an extra approval and a time-lock are imposed.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.7;

/// Amount at/above which a time-lock is imposed regardless of risk score.
pub const DEFAULT_TIME_LOCK_AMOUNT_THRESHOLD: &str = "50000";

/// Default time-lock duration once imposed.
pub const DEFAULT_TIME_LOCK_DURATION_SECS: i64 = 24 * 3600;

// ── Dispute Router ───────────────────────────────────────────────────────────

/// Score adjustment applied to arbitration/mediation/court when complexity is high.
pub const COMPLEXITY_HIGH_THRESHOLD: f64 = 0.7;
pub const COMPLEXITY_BONUS_ARBITRATION: f64 = 0.06;
pub const COMPLEXITY_BONUS_MEDIATION: f64 = 0.04;
pub const COMPLEXITY_BONUS_COURT: f64 = 0.03;

/// Multi-party / high-evidence bonus threshold and magnitude.
pub const MULTI_PARTY_THRESHOLD: u32 = 2;
pub const HIGH_EVIDENCE_THRESHOLD: usize = 5;
pub const MULTI_PARTY_BONUS: f64 = 0.05;

/// Jurisdiction adjustment magnitude.
pub const JURISDICTION_COURT_PENALTY: f64 = 0.05;
pub const JURISDICTION_ADR_BONUS: f64 = 0.05;

/// Historical-performance adjustment weights.
pub const HISTORY_SUCCESS_WEIGHT: f64 = 0.06;
pub const HISTORY_CYCLE_TIME_WEIGHT: f64 = 0.01;
pub const HISTORY_CYCLE_TIME_NORMALIZER_DAYS: f64 = 30.0;

/// Cost/time penalty weights applied to every candidate.
pub const COST_PENALTY_WEIGHT: f64 = 0.10;
pub const TIME_PENALTY_WEIGHT: f64 = 0.08;

/// Generic baseline score seeded for a method with no matching categorization
/// rule, and the confidence used to seed a low-amount mutual-agreement
/// candidate.
pub const GENERIC_CANDIDATE_BASELINE: f64 = 0.75;
pub const LOW_AMOUNT_MUTUAL_CONFIDENCE: f64 = 0.7;
pub const DISPUTE_LOW_AMOUNT_THRESHOLD: &str = "1000";

/// A `fraud` categorization disfavors purely consensual resolution paths;
/// applied to mutual-agreement and administrative candidates only.
pub const FRAUD_INFORMAL_PENALTY: f64 = 0.15;

// ── Payment Monitor ──────────────────────────────────────────────────────────

pub const DEFAULT_MONITORING_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_ALERT_CHECK_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_REALTIME_SAMPLE_INTERVAL_SECS: u64 = 5;

// ── Notification Fabric ──────────────────────────────────────────────────────

pub const DEFAULT_NOTIFICATION_HISTORY_SIZE: usize = 100;
pub const DEFAULT_MAX_ALERTS_PER_HOUR: u32 = 20;
pub const DEFAULT_MAX_ALERTS_PER_DAY: u32 = 100;
pub const DEFAULT_INAPP_CHANNEL_CAPACITY: usize = 1024;
