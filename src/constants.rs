use chrono::Duration;

/// Separator between connection indices in a `Bemerkung` annotation
pub const INDEX_SEPARATOR: char = ';';

/// Traffic light id used when none is given on the command line
pub const DEFAULT_TLS_ID: &str = "TLS_ID";

/// Output file used when none is given on the command line
pub const DEFAULT_OUTPUT_FILE: &str = "lsa.add.xml";

/// Cut points of the merged timeline closer than this are treated as one
pub const DEFAULT_CUT_TOLERANCE: Duration = Duration::milliseconds(100);

/// Number of decimal places accepted in OCIT time values (milliseconds)
pub const MAX_TIME_DECIMALS: usize = 3;

/// Label used in messages for signal groups without an `AbschaltTeilknoten`
pub const DEFAULT_NODE_LABEL: &str = "default";
