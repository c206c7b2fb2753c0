//! surveyforge — versioned survey/experiment configuration backend.
//!
//! A configuration version is a tree: general fields and an icon at the
//! root, then information cards, FAQs, a pre- and post-test form with
//! typed questions, experiment groups with phases/questions/options,
//! a username pattern and translations. Clients edit it through a
//! declarative PATCH: they submit the desired state of each section and
//! [`ConfigPatcher`] reconciles the stored tree against it — ordered
//! create/update/delete with positional `ord`, positional image slots,
//! structural guards against deleting nodes with recorded participant
//! data, and a single transaction per PATCH.

pub mod db;
pub mod error;
pub mod patch;
pub mod store;

pub use db::Database;
pub use error::{FieldError, Result, SurveyError};
pub use patch::update::{ConfigUpdate, PatchUploads};
pub use patch::{ConfigPatcher, PatchSummary};
pub use store::{ImageStore, ImageUpload};
