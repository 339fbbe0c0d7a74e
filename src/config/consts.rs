/// Name reported for factories and handlers that were not given one
pub const ANONYMOUS_MIDDLEWARE: &str = "<anonymous middleware>";
/// Suffix appended to a factory's name to name the handler it produced
pub const HANDLER_SUFFIX: &str = "handler";
/// Name of a command compiled outside a command set
pub const DEFAULT_COMMAND_NAME: &str = "execute";
/// Message used when a raised value has no string form
pub const NO_STRING_REPRESENTATION: &str = "[no string representation]";
