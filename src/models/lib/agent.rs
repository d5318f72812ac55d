use crate::{
    error::{Result, Error},
    models::{
        institution::InstitutionID,
        intermediary::IntermediaryID,
    },
};
use serde::{Serialize, Serializer, Deserialize, Deserializer};
use std::convert::TryFrom;
use std::str::FromStr;

ledger_id! {
    /// A household. Households hold deposits but never hold shares directly.
    HouseholdID
}

ledger_id! {
    /// An investment fund
    FundID
}

ledger_id! {
    /// The central bank of a simulation run
    CentralBankID
}

ledger_id! {
    /// The government of a simulation run
    GovernmentID
}

/// A trait that holds common agent functionality, generally applied to models
/// with ID types implemented in `AgentID`.
pub trait Agent {
    /// Convert the model's ID to and AgentID.
    fn agent_id(&self) -> AgentID;
}

/// Every party that can appear on a balance sheet: as a creditor, as a
/// shareholder, or as the beneficiary of an intermediary. This is a closed set
/// on purpose, since who may or may not hold equity depends on the kind of
/// agent we're dealing with.
///
/// Serializes as `<kind>:<id>` (the same as its `Display` form) so it can be
/// used as a map key in formats like JSON.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgentID {
    InstitutionID(InstitutionID),
    IntermediaryID(IntermediaryID),
    HouseholdID(HouseholdID),
    FundID(FundID),
    CentralBankID(CentralBankID),
    GovernmentID(GovernmentID),
}

impl AgentID {
    /// Whether this agent may hold shares directly. Households and the central
    /// bank cannot, so any equity owed to them is routed through an
    /// intermediary.
    pub fn can_hold_equity(&self) -> bool {
        match self {
            AgentID::HouseholdID(_) | AgentID::CentralBankID(_) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for AgentID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentID::InstitutionID(id) => write!(f, "institution:{}", id),
            AgentID::IntermediaryID(id) => write!(f, "intermediary:{}", id),
            AgentID::HouseholdID(id) => write!(f, "household:{}", id),
            AgentID::FundID(id) => write!(f, "fund:{}", id),
            AgentID::CentralBankID(id) => write!(f, "central_bank:{}", id),
            AgentID::GovernmentID(id) => write!(f, "government:{}", id),
        }
    }
}

impl FromStr for AgentID {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ':');
        let kind = parts.next().unwrap_or("");
        let id = match parts.next() {
            Some(id) => id,
            None => Err(Error::WrongAgentIDType)?,
        };
        Ok(match kind {
            "institution" => AgentID::InstitutionID(InstitutionID::new(id)),
            "intermediary" => AgentID::IntermediaryID(IntermediaryID::new(id)),
            "household" => AgentID::HouseholdID(HouseholdID::new(id)),
            "fund" => AgentID::FundID(FundID::new(id)),
            "central_bank" => AgentID::CentralBankID(CentralBankID::new(id)),
            "government" => AgentID::GovernmentID(GovernmentID::new(id)),
            _ => Err(Error::WrongAgentIDType)?,
        })
    }
}

impl Serialize for AgentID {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where S: Serializer
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentID {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where D: Deserializer<'de>
    {
        let val = String::deserialize(deserializer)?;
        val.parse().map_err(serde::de::Error::custom)
    }
}

/// Implements `From<ModelID> for AgentID` and also `TryFrom<AgentID> for ModelID`
macro_rules! impl_agent_for_model_id {
    ($idty:ident) => {
        impl From<$idty> for AgentID {
            fn from(val: $idty) -> Self {
                AgentID::$idty(val)
            }
        }

        impl TryFrom<AgentID> for $idty {
            type Error = Error;

            fn try_from(val: AgentID) -> Result<Self> {
                Ok(match val {
                    AgentID::$idty(id) => id,
                    _ => Err(Error::WrongAgentIDType)?,
                })
            }
        }
    };
}

impl_agent_for_model_id! { InstitutionID }
impl_agent_for_model_id! { IntermediaryID }
impl_agent_for_model_id! { HouseholdID }
impl_agent_for_model_id! { FundID }
impl_agent_for_model_id! { CentralBankID }
impl_agent_for_model_id! { GovernmentID }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equity_eligibility() {
        assert!(AgentID::from(InstitutionID::new("bank")).can_hold_equity());
        assert!(AgentID::from(FundID::new("fund")).can_hold_equity());
        assert!(AgentID::from(GovernmentID::new("gov")).can_hold_equity());
        assert!(AgentID::from(IntermediaryID::new("steward")).can_hold_equity());
        assert!(!AgentID::from(HouseholdID::new("jerry")).can_hold_equity());
        assert!(!AgentID::from(CentralBankID::new("cb")).can_hold_equity());
    }

    #[test]
    fn converts() {
        let agent: AgentID = FundID::new("larry's fund").into();
        assert_eq!(FundID::try_from(agent.clone()).unwrap(), FundID::new("larry's fund"));
        assert_eq!(HouseholdID::try_from(agent.clone()), Err(Error::WrongAgentIDType));
        assert_eq!(format!("{}", agent), "fund:larry's fund");
    }

    #[test]
    fn parses() {
        let agents: Vec<AgentID> = vec![
            InstitutionID::new("bank").into(),
            IntermediaryID::new("steward").into(),
            HouseholdID::new("jerry").into(),
            FundID::new("fund").into(),
            CentralBankID::new("cb").into(),
            GovernmentID::new("gov").into(),
        ];
        for agent in agents {
            assert_eq!(format!("{}", agent).parse::<AgentID>(), Ok(agent));
        }
        // only the first colon separates the kind
        assert_eq!("fund:a:b".parse::<AgentID>(), Ok(AgentID::from(FundID::new("a:b"))));
        assert_eq!("fund".parse::<AgentID>(), Err(Error::WrongAgentIDType));
        assert_eq!("bakery:jerry".parse::<AgentID>(), Err(Error::WrongAgentIDType));
    }

    #[test]
    fn serializes_as_string() {
        let agent: AgentID = CentralBankID::new("cb").into();
        assert_eq!(serde_json::to_string(&agent).unwrap(), r#""central_bank:cb""#);
        let back: AgentID = serde_json::from_str(r#""central_bank:cb""#).unwrap();
        assert_eq!(back, agent);
        assert!(serde_json::from_str::<AgentID>(r#""nobody""#).is_err());

        let mut map = std::collections::BTreeMap::new();
        map.insert(agent.clone(), 3);
        map.insert(AgentID::from(HouseholdID::new("jerry")), 4);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"household:jerry":4,"central_bank:cb":3}"#);
    }
}
