//! Centralized default constants for metagrid.
//!
//! Configuration structs and the schema builders reference these constants
//! instead of repeating literal values.

// =============================================================================
// FILTER SCHEMA
// =============================================================================

/// Name of the synthetic column that groups descendant-only attributes.
pub const DESCENDANT_COLUMN_NAME: &str = "_descendant";

/// Column type of the synthetic descendant column.
pub const DESCENDANT_COLUMN_TYPE: &str = "descendant";

/// Default label of the synthetic descendant column.
pub const DESCENDANT_COLUMN_LABEL: &str = "Attributes of descendant classes";

/// Remote endpoint that resolves user references for selector columns.
pub const USER_SELECT_URL: &str = "office/user/list-select";

/// Prefix prepended to attribute translation keys.
pub const TRANSLATE_PREFIX: &str = "meta";

/// Search depth assumed for relation attributes that declare none.
pub const RELATION_SEARCH_DEPTH: u32 = 0;

// =============================================================================
// GRID
// =============================================================================

/// Default key attribute name of a metadata class.
pub const CLASS_KEY: &str = "_id";

/// Label of the synthetic key column added to grids without a key attribute.
pub const KEY_COLUMN_LABEL: &str = "ID";

/// Suffix of the companion column that carries display titles.
pub const TITLE_NAME_SUFFIX: &str = "_title";

// =============================================================================
// FILE ENDPOINTS
// =============================================================================

/// File download endpoint.
pub const DOWNLOAD_URL: &str = "api/base/file/download";

/// File thumbnail endpoint.
pub const THUMBNAIL_URL: &str = "api/base/file/thumbnail";

/// File upload endpoint.
pub const UPLOAD_URL: &str = "api/base/file/upload";

/// File delete route.
pub const DELETE_URL: &str = "file/delete";

/// Model edit route used to link relation cells.
pub const UPDATE_URL: &str = "model/update";

// =============================================================================
// SELECT LISTS
// =============================================================================

/// Minimum search text length before select lists are filtered.
pub const SEARCH_MIN_LENGTH: usize = 2;

// =============================================================================
// CONFIG
// =============================================================================

/// Directory name under the user config dir.
pub const CONFIG_DIR_NAME: &str = "metagrid";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "metagrid.toml";

/// Default tracing filter for the binary.
pub const LOG_FILTER: &str = "metagrid=info,metagrid_core=info";
