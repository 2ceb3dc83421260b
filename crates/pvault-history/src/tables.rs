//! Table and column names used against the row store.

pub const PROCESSES: &str = "processes";
pub const VERSIONS: &str = "process_versions";
pub const PROFILES: &str = "profiles";

pub mod columns {
    pub const ID: &str = "id";
    pub const PROCESS_ID: &str = "process_id";
    pub const BOARD_ID: &str = "board_id";
    pub const VERSION_NUMBER: &str = "version_number";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const STATUS: &str = "status";
    pub const BPMN_XML: &str = "bpmn_xml";
    pub const CURRENT_VERSION_ID: &str = "current_version_id";
    pub const VERSION: &str = "version";
}
