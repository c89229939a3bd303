//! ASA class to risk tier and anaesthetic plan.

use crate::asa::AsaClass;
use crate::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};

/// Coarse risk bucket derived solely from the ASA class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
        };
        f.write_str(text)
    }
}

/// Risk tier and recommended anaesthetic plan for one ASA class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub asa: AsaClass,
    pub tier: RiskTier,
    pub plan: &'static str,
}

/// Stateless ASA classifier.
pub struct RiskClassifier;

impl RiskClassifier {
    /// Classifies a raw ASA integer.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Classification` if `asa` is outside 1 to 5.
    pub fn classify(asa: i64) -> PlannerResult<Classification> {
        let asa = AsaClass::new(asa).map_err(|_| PlannerError::Classification(asa))?;
        Ok(asa.classification())
    }
}

impl AsaClass {
    /// Risk tier and plan for an already validated class.
    pub fn classification(self) -> Classification {
        let (tier, plan) = match self.value() {
            1 => (RiskTier::Low, "General anesthesia with minimal monitoring."),
            2 => (RiskTier::Low, "General anesthesia with standard monitoring."),
            3 => (
                RiskTier::Moderate,
                "Regional or general anesthesia with close monitoring.",
            ),
            4 => (
                RiskTier::Moderate,
                "Intensive monitoring and possible additional resources.",
            ),
            _ => (
                RiskTier::High,
                "Advanced preparation and possible additional support required.",
            ),
        };

        Classification {
            asa: self,
            tier,
            plan,
        }
    }
}
