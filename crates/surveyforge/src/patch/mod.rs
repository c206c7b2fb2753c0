//! Hierarchical configuration PATCH processing.
//!
//! One PATCH is one database transaction: every section reconciles
//! inside it, any error rolls everything back, and file writes staged
//! in the [`FileJournal`] run only after the commit.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::config_repo::{self, ConfigRow};
use crate::db::Database;
use crate::error::{Result, SurveyError};
use crate::store::{FileJournal, ImageCategory, ImageStore};

pub mod clone;
pub mod cursor;
pub mod guard;
pub mod reconcile;
pub mod sections;
pub mod update;
pub mod validate;

use cursor::{ImageSlotCursor, SlotValue};
use reconcile::{reconcile, PatchCtx};
use sections::faq::FaqAdapter;
use sections::form::reconcile_form;
use sections::info_card::InfoCardAdapter;
use sections::pattern::reconcile_pattern;
use sections::test::TestGroupAdapter;
use sections::translation::reconcile_translations;
use sections::{collect_orphan, resolve_image};
use update::{normalize, ConfigUpdate, PatchUploads};

use crate::db::form_repo::FormKind;

/// Which sections a PATCH actually changed, with a line of detail per
/// section. Sections that turned out to be no-ops are absent.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PatchSummary {
    sections: BTreeMap<String, String>,
}

impl PatchSummary {
    fn note(&mut self, section: &str, changed: bool, detail: &str) {
        if changed {
            self.sections.insert(section.to_string(), detail.to_string());
        }
    }

    /// True when the PATCH changed nothing at all.
    pub fn is_noop(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &BTreeMap<String, String> {
        &self.sections
    }
}

/// Applies PATCHes against stored configuration versions.
pub struct ConfigPatcher {
    db: Database,
    store: ImageStore,
}

impl ConfigPatcher {
    pub fn new(db: Database, store: ImageStore) -> Self {
        Self { db, store }
    }

    /// Applies one PATCH to `version`.
    ///
    /// Validation runs first and fails without touching anything. The
    /// reconciliation itself is a single transaction; the staged file
    /// operations are flushed only after it commits.
    pub fn apply(
        &self,
        version: i64,
        update: &ConfigUpdate,
        uploads: PatchUploads,
    ) -> Result<PatchSummary> {
        validate::validate(update, &uploads)?;
        let PatchUploads { icon, slots } = uploads;

        let (summary, journal) = self.db.with_tx(|tx| {
            let mut journal = FileJournal::new();
            let mut cursor = ImageSlotCursor::new(slots);
            let mut ctx = PatchCtx {
                conn: tx,
                store: &self.store,
                journal: &mut journal,
                cursor: &mut cursor,
            };
            let mut summary = PatchSummary::default();

            let stored = config_repo::find_by_version(ctx.conn, version)?
                .ok_or_else(|| SurveyError::NotFound(format!("config version {version}")))?;

            let mut desired = ConfigRow {
                version,
                title: update.title.clone(),
                subtitle: normalize(update.subtitle.as_deref()),
                description: normalize(update.description.as_deref()),
                anonymous: update.anonymous,
                informed_consent: normalize(update.informed_consent.as_deref()),
                icon_id: stored.icon_id,
                pattern_id: stored.pattern_id,
            };
            let general_changed = desired != stored;

            let icon_change = resolve_image(
                &mut ctx,
                stored.icon_id,
                SlotValue::from_slot(icon),
                ImageCategory::ConfigIcon,
            )?;
            desired.icon_id = icon_change.image_id;

            let pattern_changed =
                reconcile_pattern(&mut ctx, &mut desired, update.pattern.as_ref())?;

            if desired != stored {
                config_repo::update(ctx.conn, &desired)?;
            }
            collect_orphan(&mut ctx, icon_change.orphan)?;

            summary.note("general", general_changed, "updated");
            summary.note("icon", icon_change.changed, "updated");
            summary.note("pattern", pattern_changed, "updated");

            let cards = reconcile(
                &InfoCardAdapter { version },
                &mut ctx,
                update.info_cards.as_deref(),
            )?;
            summary.note("informationCards", cards, "updated");

            let faqs = reconcile(&FaqAdapter { version }, &mut ctx, update.faqs.as_deref())?;
            summary.note("faq", faqs, "updated");

            let pre = reconcile_form(&mut ctx, version, FormKind::Pre, update.pre_test_form.as_ref())?;
            summary.note("preTestForm", pre, "updated");

            let post =
                reconcile_form(&mut ctx, version, FormKind::Post, update.post_test_form.as_ref())?;
            summary.note("postTestForm", post, "updated");

            let groups = reconcile(
                &TestGroupAdapter { version },
                &mut ctx,
                update.groups.as_deref(),
            )?;
            summary.note("groups", groups, "updated");

            let translations =
                reconcile_translations(&mut ctx, version, update.translations.as_deref())?;
            summary.note("translations", translations, "updated");

            Ok::<_, SurveyError>((summary, journal))
        })?;

        if summary.is_noop() {
            log::debug!("PATCH against version {version} changed nothing");
        } else {
            log::info!(
                "PATCH against version {version} changed: {}",
                summary
                    .sections()
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        journal.commit();
        Ok(summary)
    }

    /// Deep-copies `src` into a fresh version numbered one past the
    /// current highest. Returns the new version number.
    pub fn clone_version(&self, src: i64) -> Result<i64> {
        let (dst, journal) = self.db.with_tx(|tx| {
            let latest = config_repo::find_latest(tx)?
                .map(|c| c.version)
                .unwrap_or(0);
            let dst = latest + 1;
            let mut journal = FileJournal::new();
            clone::clone_version(tx, &self.store, &mut journal, src, dst)?;
            Ok::<_, SurveyError>((dst, journal))
        })?;
        journal.commit();
        Ok(dst)
    }

    /// Whether participant data exists anywhere under this version.
    pub fn has_attempts(&self, version: i64) -> Result<bool> {
        self.db
            .with_conn(|conn| config_repo::has_attempts(conn, version))
            .map_err(SurveyError::from)
    }
}
