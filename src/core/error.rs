use thiserror::Error;

/// Failures while compiling or evaluating a formula
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Syntax error in '{formula}': {message}")]
    Syntax { formula: String, message: String },

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function {func} expected {expected} args, got {got}")]
    InvalidArgCount {
        func: String,
        expected: String,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Missing binding: {0}")]
    MissingBinding(String),
}

/// Content problems found while building or sealing a body plan
///
/// These are fatal to loading the plan and never surface mid-combat.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    #[error("Unknown ancestor '{parent}' for part '{part}'")]
    UnknownAncestor { part: String, parent: String },

    #[error("Duplicate alias: {0}")]
    DuplicateAlias(String),

    #[error("Linking '{child}' under '{parent}' would close a cycle")]
    CycleDetected { child: String, parent: String },

    #[error("Structure '{0}' has no coverage link and can never be hit")]
    UnreachableStructure(String),

    #[error("Structure '{0}' has more than one primary coverage link")]
    MultiplePrimary(String),

    #[error("'{0}' is not a bone")]
    NotABone(String),

    #[error("'{0}' is not an organ")]
    NotAnOrgan(String),

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Unknown structure: {0}")]
    UnknownStructure(String),

    #[error("Limb '{limb}' includes '{part}' which is outside its root's subtree")]
    LimbNotContiguous { limb: String, part: String },

    #[error("Part '{part}' is claimed by both '{first}' and '{second}'")]
    PartInMultipleLimbs {
        part: String,
        first: String,
        second: String,
    },

    #[error("Spinal segment '{0}' is not hosted by any part")]
    UnhostedSegment(String),

    #[error("Invalid value for '{field}' on '{alias}': {value}")]
    InvalidValue {
        alias: String,
        field: &'static str,
        value: f32,
    },
}

/// Recoverable failures while resolving one attack
///
/// The caller decides the fallback (re-roll with relaxed filters, or a miss).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("No body part matches the attack's targeting filter")]
    NoValidTarget,

    #[error("Layer '{layer}' needs a value for '{variable}'")]
    MissingBinding { layer: String, variable: String },

    #[error("Formula failed on layer '{layer}': {source}")]
    Formula {
        layer: String,
        #[source]
        source: FormulaError,
    },
}

/// Invalid resolver configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Failures while loading body definitions from disk or text
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown material '{material}' referenced by '{by}'")]
    UnknownMaterial { material: String, by: String },

    #[error("Unknown armor layer '{layer}' referenced by '{by}'")]
    UnknownArmor { layer: String, by: String },

    #[error("Unknown damage type '{name}' in armor '{layer}'")]
    UnknownDamageType { name: String, layer: String },

    #[error("Unknown part '{part}' referenced by attack '{attack}'")]
    UnknownAttackPart { part: String, attack: String },

    #[error("Duplicate material: {0}")]
    DuplicateMaterial(String),

    #[error("Duplicate armor layer: {0}")]
    DuplicateArmor(String),

    #[error("Duplicate body plan: {0}")]
    DuplicatePlan(String),

    #[error("Body plan not found: {0}")]
    UnknownPlan(String),

    #[error("Natural attack not found: {0}")]
    UnknownAttack(String),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),
}

#[derive(Error, Debug)]
pub enum AnatomyError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnatomyError>;
