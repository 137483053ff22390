use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Id, IdRef};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Id,
    pub edge: IdRef,
    /// Relative position along the edge, from `node_a` (0.0) to `node_b` (1.0).
    pub distance_edge: f64,
    pub direction: SignalDirection,
    pub function: SignalFunction,
    pub kind: SignalKind,
    pub name: Option<String>,
    pub supported_states: Vec<SignalState>,
    pub additional_signals: Vec<AdditionalSignal>,
}

impl Signal {
    pub fn new(
        id: impl Into<Id>,
        edge: impl Into<IdRef>,
        distance_edge: f64,
        direction: SignalDirection,
        function: SignalFunction,
        kind: SignalKind,
    ) -> Signal {
        Signal {
            id: id.into(),
            edge: edge.into(),
            distance_edge,
            direction,
            function,
            kind,
            name: None,
            supported_states: kind.default_states(),
            additional_signals: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Signal {
        self.name = Some(name.into());
        self
    }

    pub fn with_states(mut self, states: Vec<SignalState>) -> Signal {
        self.supported_states = states;
        self
    }

    pub fn with_additional(mut self, additional: AdditionalSignal) -> Signal {
        self.additional_signals.push(additional);
        self
    }

    pub fn supports(&self, state: SignalState) -> bool {
        self.supported_states.contains(&state)
    }
}

/// Effective direction relative to the `node_a -> node_b` sense of the owning edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    In,
    Gegen,
}

impl SignalDirection {
    pub fn opposite(&self) -> SignalDirection {
        match self {
            SignalDirection::In => SignalDirection::Gegen,
            SignalDirection::Gegen => SignalDirection::In,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub enum SignalFunction {
    #[serde(rename = "Einfahr_Signal")]
    Einfahr,
    #[serde(rename = "Ausfahr_Signal")]
    Ausfahr,
    #[serde(rename = "Block_Signal")]
    Block,
    #[serde(rename = "Zwischen_Signal")]
    Zwischen,
    #[serde(rename = "andere")]
    Andere,
}

impl fmt::Display for SignalFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SignalFunction::Einfahr => "Einfahr_Signal",
            SignalFunction::Ausfahr => "Ausfahr_Signal",
            SignalFunction::Block => "Block_Signal",
            SignalFunction::Zwischen => "Zwischen_Signal",
            SignalFunction::Andere => "andere",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub enum SignalKind {
    Hauptsignal,
    Mehrabschnittssignal,
    Vorsignal,
    Sperrsignal,
    Hauptsperrsignal,
    #[serde(rename = "andere")]
    Andere,
}

impl SignalKind {
    /// Aspects a signal of this kind shows when nothing else is configured.
    pub fn default_states(&self) -> Vec<SignalState> {
        use SignalState::*;
        match self {
            SignalKind::Hauptsignal => vec![Hp0, Hp1, Hp2],
            SignalKind::Mehrabschnittssignal => vec![Hp0, Ks1, Ks2],
            SignalKind::Vorsignal => vec![Ks1, Ks2],
            SignalKind::Sperrsignal => vec![Hp0, Sh1],
            SignalKind::Hauptsperrsignal => vec![Hp0, Hp1, Hp2, Sh1],
            SignalKind::Andere => Vec::new(),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SignalKind::Hauptsignal => "Hauptsignal",
            SignalKind::Mehrabschnittssignal => "Mehrabschnittssignal",
            SignalKind::Vorsignal => "Vorsignal",
            SignalKind::Sperrsignal => "Sperrsignal",
            SignalKind::Hauptsperrsignal => "Hauptsperrsignal",
            SignalKind::Andere => "andere",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Hp0,
    Hp1,
    Hp2,
    Ks1,
    Ks2,
    Sh1,
    Zs1,
    Zs7,
    Zs8,
}

/// Attachments shown next to a main signal. Zs3/Zs3v carry speed classes
/// (km/h divided by ten), the others carry opaque symbol names.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdditionalSignal {
    Zs3 { symbols: Vec<u32> },
    Zs3v { symbols: Vec<u32> },
    Zs2 { symbols: Vec<String> },
    Zs2v { symbols: Vec<String> },
    Other { symbols: Vec<String> },
}
