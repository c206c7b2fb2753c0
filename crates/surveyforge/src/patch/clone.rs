//! Deep configuration cloning.
//!
//! Copies every section of a source version into a destination
//! version: content verbatim, `ord` preserved, and every image
//! physically duplicated so the two versions never share files. The
//! pattern link is the one exception — pattern rows form a shared
//! library and the clone points at the same row.
//!
//! Each section has its own entry point so a caller can clone the
//! untouched sections of a version while reconciling the edited ones.

use rusqlite::Connection;

use crate::db::{config_repo, form_repo, home_repo, test_repo};
use crate::db::form_repo::FormKind;
use crate::error::{Result, SurveyError};
use crate::store::{FileJournal, ImageCategory, ImageStore};

/// Clones every section of `src` into the new version `dst`.
pub fn clone_version(
    conn: &Connection,
    store: &ImageStore,
    journal: &mut FileJournal,
    src: i64,
    dst: i64,
) -> Result<()> {
    let source = config_repo::find_by_version(conn, src)?
        .ok_or_else(|| SurveyError::NotFound(format!("config version {src}")))?;
    if config_repo::find_by_version(conn, dst)?.is_some() {
        return Err(SurveyError::Conflict(format!(
            "config version {dst} already exists"
        )));
    }

    let icon_id = duplicate_image(conn, store, journal, source.icon_id, ImageCategory::ConfigIcon)?;
    config_repo::insert(
        conn,
        &config_repo::ConfigRow {
            version: dst,
            icon_id,
            ..source
        },
    )?;

    clone_info_cards(conn, store, journal, src, dst)?;
    clone_faqs(conn, src, dst)?;
    clone_form(conn, store, journal, src, dst, FormKind::Pre)?;
    clone_form(conn, store, journal, src, dst, FormKind::Post)?;
    clone_groups(conn, store, journal, src, dst)?;
    clone_translations(conn, src, dst)?;

    log::info!("Cloned config version {src} into {dst}");
    Ok(())
}

pub fn clone_info_cards(
    conn: &Connection,
    store: &ImageStore,
    journal: &mut FileJournal,
    src: i64,
    dst: i64,
) -> Result<()> {
    for card in home_repo::find_info_cards(conn, src)? {
        let icon_id = duplicate_image(conn, store, journal, card.icon_id, ImageCategory::InfoCard)?;
        home_repo::insert_info_card(
            conn,
            &home_repo::InfoCardRow {
                id: 0,
                config_version: dst,
                icon_id,
                ..card
            },
        )?;
    }
    Ok(())
}

pub fn clone_faqs(conn: &Connection, src: i64, dst: i64) -> Result<()> {
    for faq in home_repo::find_faqs(conn, src)? {
        home_repo::insert_faq(
            conn,
            &home_repo::FaqRow {
                id: 0,
                config_version: dst,
                ..faq
            },
        )?;
    }
    Ok(())
}

pub fn clone_form(
    conn: &Connection,
    store: &ImageStore,
    journal: &mut FileJournal,
    src: i64,
    dst: i64,
    kind: FormKind,
) -> Result<()> {
    let Some(form) = form_repo::find_form(conn, src, kind)? else {
        return Ok(());
    };
    let new_form = form_repo::insert_form(conn, dst, kind, form.title.as_deref())?;

    for question in form_repo::find_questions(conn, form.id)? {
        let image_id = duplicate_image(
            conn,
            store,
            journal,
            question.image_id,
            ImageCategory::FormQuestion,
        )?;
        let new_question = form_repo::insert_question(
            conn,
            &form_repo::FormQuestionRow {
                id: 0,
                form_id: new_form,
                image_id,
                ..question.clone()
            },
        )?;

        for option in form_repo::find_options(conn, question.id)? {
            let image_id = duplicate_image(
                conn,
                store,
                journal,
                option.image_id,
                ImageCategory::FormOption,
            )?;
            form_repo::insert_option(
                conn,
                &form_repo::FormOptionRow {
                    id: 0,
                    question_id: new_question,
                    image_id,
                    ..option
                },
            )?;
        }
        for label in form_repo::find_slider_labels(conn, question.id)? {
            form_repo::insert_slider_label(
                conn,
                &form_repo::SliderLabelRow {
                    id: 0,
                    question_id: new_question,
                    ..label
                },
            )?;
        }
    }
    Ok(())
}

pub fn clone_groups(
    conn: &Connection,
    store: &ImageStore,
    journal: &mut FileJournal,
    src: i64,
    dst: i64,
) -> Result<()> {
    for group in test_repo::find_groups(conn, src)? {
        let new_group = test_repo::insert_group(
            conn,
            &test_repo::TestGroupRow {
                id: 0,
                config_version: dst,
                ..group.clone()
            },
        )?;

        for phase in test_repo::find_phases(conn, group.id)? {
            let new_phase = test_repo::insert_phase(
                conn,
                &test_repo::TestPhaseRow {
                    id: 0,
                    group_id: new_group,
                    ..phase
                },
            )?;

            for question in test_repo::find_questions(conn, phase.id)? {
                let image_id = duplicate_image(
                    conn,
                    store,
                    journal,
                    question.image_id,
                    ImageCategory::TestQuestion,
                )?;
                let new_question = test_repo::insert_question(
                    conn,
                    &test_repo::TestQuestionRow {
                        id: 0,
                        phase_id: new_phase,
                        image_id,
                        ..question.clone()
                    },
                )?;

                for option in test_repo::find_options(conn, question.id)? {
                    let image_id = duplicate_image(
                        conn,
                        store,
                        journal,
                        option.image_id,
                        ImageCategory::TestOption,
                    )?;
                    test_repo::insert_option(
                        conn,
                        &test_repo::TestOptionRow {
                            id: 0,
                            question_id: new_question,
                            image_id,
                            ..option
                        },
                    )?;
                }
            }
        }
    }
    Ok(())
}

pub fn clone_translations(conn: &Connection, src: i64, dst: i64) -> Result<()> {
    for value in config_repo::find_translation_values(conn, src)? {
        config_repo::insert_translation_value(conn, dst, value.key_id, &value.value)?;
    }
    Ok(())
}

fn duplicate_image(
    conn: &Connection,
    store: &ImageStore,
    journal: &mut FileJournal,
    image_id: Option<i64>,
    category: ImageCategory,
) -> Result<Option<i64>> {
    match image_id {
        Some(id) => Ok(Some(store.duplicate(conn, journal, id, category)?)),
        None => Ok(None),
    }
}
