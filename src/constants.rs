//! Defaults for the remote source and the dataset build.
//! All of them can be overridden from `config.toml`.

pub const SPACEX_API_BASE_URL: &str = "https://api.spacexdata.com/v4";

// Collection paths, relative to the base URL
pub const PAST_LAUNCHES_PATH: &str = "launches/past";
pub const ROCKETS_PATH: &str = "rockets";
pub const LAUNCHPADS_PATH: &str = "launchpads";
pub const PAYLOADS_PATH: &str = "payloads";
pub const CORES_PATH: &str = "cores";

/// Last launch day (inclusive) that belongs to the analytical dataset
pub const CUTOFF_DATE: (i32, u32, u32) = (2020, 11, 13);

/// Legacy single-core vehicle line dropped from the final dataset
pub const LEGACY_BOOSTER: &str = "Falcon 1";

pub const DEFAULT_CSV_PATH: &str = "dataset_part_1.csv";
pub const DEFAULT_HTML_PATH: &str = "table1.html";

pub const CONFIG_PATH: &str = "config.toml";

/// Export column headers, in output order
pub const COLUMNS: [&str; 17] = [
    "FlightNumber",
    "Date",
    "BoosterVersion",
    "PayloadMass",
    "Orbit",
    "LaunchSite",
    "Longitude",
    "Latitude",
    "Outcome",
    "Flights",
    "GridFins",
    "Reused",
    "Legs",
    "LandingPad",
    "Block",
    "ReusedCount",
    "Serial",
];

/// Rows shown in the debug preview after export
pub const PREVIEW_ROWS: usize = 5;
