//! Typed touches captured while a rally is being recorded.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Match-local player identifier.
pub type PlayerId = i64;

/// The two teams of a match. `Casa` is the home side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Casa,
    Fora,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Casa, Side::Fora];

    pub fn opposite(self) -> Side {
        match self {
            Side::Casa => Side::Fora,
            Side::Fora => Side::Casa,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Casa => f.write_str("CASA"),
            Side::Fora => f.write_str("FORA"),
        }
    }
}

/// Quality of a touch on the 0..=3 scale (3 best, 0 worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Code(u8);

impl Code {
    pub const ERROR: Code = Code(0);
    pub const POOR: Code = Code(1);
    pub const GOOD: Code = Code(2);
    pub const PERFECT: Code = Code(3);

    pub fn new(value: u8) -> Option<Code> {
        (value <= 3).then_some(Code(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Codes 0 and 3 end the rally for serves and receptions.
    pub fn is_terminal(self) -> bool {
        self.0 == 0 || self.0 == 3
    }
}

impl TryFrom<u8> for Code {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Code::new(value).ok_or_else(|| format!("code {value} is outside 0..=3"))
    }
}

impl From<Code> for u8 {
    fn from(code: Code) -> u8 {
        code.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a kill landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KillType {
    Floor,
    Blockout,
}

/// Why a point ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Reason {
    Ace,
    Se,
    Kill,
    Ae,
    Blk,
    Op,
    Def,
    Net,
}

/// Where the setter sent the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// Outside hitter, zone 4.
    #[serde(rename = "4")]
    Outside,
    /// Middle quick, zone 3.
    #[serde(rename = "3")]
    Middle,
    /// Opposite, zone 2.
    #[serde(rename = "2")]
    Opposite,
    /// Back-row centre attack, zone 6.
    #[serde(rename = "P")]
    Pipe,
    /// Back-row right attack, zone 1.
    #[serde(rename = "1")]
    BackRight,
}

impl Destination {
    pub const ALL: [Destination; 5] = [
        Destination::Outside,
        Destination::Middle,
        Destination::Opposite,
        Destination::Pipe,
        Destination::BackRight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Destination::Outside => "4",
            Destination::Middle => "3",
            Destination::Opposite => "2",
            Destination::Pipe => "P",
            Destination::BackRight => "1",
        }
    }
}

/// Kind tag of an [`Action`], used for messages and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Serve,
    Reception,
    Setter,
    Attack,
    Block,
    Defense,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionType::Serve => "serve",
            ActionType::Reception => "reception",
            ActionType::Setter => "setter",
            ActionType::Attack => "attack",
            ActionType::Block => "block",
            ActionType::Defense => "defense",
        };
        f.write_str(name)
    }
}

/// A serve, reception or defense touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touch {
    pub side: Side,
    pub player_id: Option<PlayerId>,
    pub code: Option<Code>,
}

impl Touch {
    pub fn new(side: Side, player_id: Option<PlayerId>, code: Option<Code>) -> Self {
        Self { side, player_id, code }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetterTouch {
    pub side: Side,
    pub setter_id: Option<PlayerId>,
    pub pass_destination: Option<Destination>,
    pub pass_code: Option<Code>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackTouch {
    pub side: Side,
    pub player_id: Option<PlayerId>,
    pub code: Option<Code>,
    /// Only meaningful on a kill.
    #[serde(default)]
    pub kill_type: Option<KillType>,
    /// Result of the block when the attack was touched (code 1).
    #[serde(default)]
    pub block_code: Option<Code>,
    /// Quality of the set the attacker received.
    #[serde(default)]
    pub pass_quality: Option<Code>,
}

impl AttackTouch {
    pub fn new(side: Side, player_id: Option<PlayerId>, code: Option<Code>) -> Self {
        Self {
            side,
            player_id,
            code,
            kill_type: None,
            block_code: None,
            pass_quality: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTouch {
    pub side: Side,
    pub blockers: [Option<PlayerId>; 3],
    pub code: Option<Code>,
}

/// One observed touch, discriminated by its `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Serve(Touch),
    Reception(Touch),
    Setter(SetterTouch),
    Attack(AttackTouch),
    Block(BlockTouch),
    Defense(Touch),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Serve(_) => ActionType::Serve,
            Action::Reception(_) => ActionType::Reception,
            Action::Setter(_) => ActionType::Setter,
            Action::Attack(_) => ActionType::Attack,
            Action::Block(_) => ActionType::Block,
            Action::Defense(_) => ActionType::Defense,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Action::Serve(t) | Action::Reception(t) | Action::Defense(t) => t.side,
            Action::Setter(s) => s.side,
            Action::Attack(a) => a.side,
            Action::Block(b) => b.side,
        }
    }

    /// Primary player of the touch (first blocker for blocks).
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Action::Serve(t) | Action::Reception(t) | Action::Defense(t) => t.player_id,
            Action::Setter(s) => s.setter_id,
            Action::Attack(a) => a.player_id,
            Action::Block(b) => b.blockers.iter().flatten().next().copied(),
        }
    }

    pub fn code(&self) -> Option<Code> {
        match self {
            Action::Serve(t) | Action::Reception(t) | Action::Defense(t) => t.code,
            Action::Setter(s) => s.pass_code,
            Action::Attack(a) => a.code,
            Action::Block(b) => b.code,
        }
    }

    /// Setter, attack, block and defense touches can be entered freely.
    pub fn is_free_form(&self) -> bool {
        !matches!(self, Action::Serve(_) | Action::Reception(_))
    }
}
