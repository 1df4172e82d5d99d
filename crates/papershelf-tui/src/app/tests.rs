use chrono::NaiveDate;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use papershelf_core::{Author, ReadingStatus, RepoError};

use super::*;
use crate::action::Action;
use crate::tui_event::{BackendEvent, SaveOutcome};

/// Create a minimal App for testing (no backend, no files).
fn test_app() -> App {
    App::new(Settings::default())
}

fn paper(id: PaperId, title: &str) -> Paper {
    Paper {
        paper_id: id,
        title: title.to_string(),
        authors: vec![Author::new("Ada Lovelace")],
        r#abstract: None,
        keywords: vec![],
        collections: vec![],
        status: ReadingStatus::Unread,
        is_favourite: false,
        publication_date: None,
        added_date: NaiveDate::from_ymd_opt(2024, 3, id as u32)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap(),
        pdf_path: Some(format!("uploads/{id}.pdf")),
        pdf_hash: None,
    }
}

/// App with papers loaded and a channel capturing backend commands.
fn loaded_app(papers: Vec<Paper>) -> (App, mpsc::UnboundedReceiver<BackendCommand>) {
    let mut app = test_app();
    let (tx, rx) = mpsc::unbounded_channel();
    app.backend_cmd_tx = Some(tx);
    let ticket = app.library.begin_load();
    app.library.finish_load(&ticket, Ok(papers));
    (app, rx)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.update(Action::Input(c));
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<BackendCommand>) -> Vec<BackendCommand> {
    let mut out = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

fn server_error(detail: &str) -> RepoError {
    RepoError::Server {
        status: 500,
        payload: papershelf_core::ErrorPayload::from_body(&format!(r#"{{"detail":"{detail}"}}"#)),
    }
}

// ── Loading ─────────────────────────────────────────────────────

#[test]
fn load_requests_papers_and_collections() {
    let mut app = test_app();
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.backend_cmd_tx = Some(tx);
    app.load();
    let cmds = drain(&mut rx);
    assert!(matches!(cmds[0], BackendCommand::LoadPapers { .. }));
    assert!(matches!(cmds[1], BackendCommand::LoadCollections { .. }));
}

#[test]
fn quit_returns_true() {
    let mut app = test_app();
    assert!(app.update(Action::Quit));
    assert!(app.should_quit);
}

// ── Favourite ───────────────────────────────────────────────────

#[test]
fn favourite_applies_only_after_confirmation() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::ToggleFavourite);

    let request = match drain(&mut rx).pop() {
        Some(BackendCommand::SetFavourite { request }) => request,
        other => panic!("unexpected command: {other:?}"),
    };
    assert!(request.favourite);
    assert!(!app.library.paper(1).unwrap().is_favourite);

    app.handle_backend_event(BackendEvent::FavouriteSet {
        request,
        result: Ok(()),
    });
    assert!(app.library.paper(1).unwrap().is_favourite);
    assert_eq!(app.library.favourite_count(), 1);
}

#[test]
fn crossed_favourite_responses_refetch_the_paper() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::ToggleFavourite);
    app.update(Action::ToggleFavourite);
    let mut requests = drain(&mut rx).into_iter().map(|cmd| match cmd {
        BackendCommand::SetFavourite { request } => request,
        other => panic!("unexpected command: {other:?}"),
    });
    let (first, second) = (requests.next().unwrap(), requests.next().unwrap());

    app.handle_backend_event(BackendEvent::FavouriteSet {
        request: first,
        result: Ok(()),
    });
    app.handle_backend_event(BackendEvent::FavouriteSet {
        request: second,
        result: Err(server_error("set_favourite failed")),
    });
    assert!(!app.library.paper(1).unwrap().is_favourite);

    let Some(BackendCommand::RefreshPaper { ticket, paper_id }) = drain(&mut rx).pop() else {
        panic!("expected a refresh");
    };
    assert_eq!(paper_id, 1);
    let mut server_copy = paper(1, "One");
    server_copy.is_favourite = true;
    app.handle_backend_event(BackendEvent::PaperRefreshed {
        ticket,
        paper_id,
        result: Ok(server_copy),
    });
    assert!(app.library.paper(1).unwrap().is_favourite);
}

// ── Status ──────────────────────────────────────────────────────

#[test]
fn failed_status_shows_server_detail() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::SetStatus(ReadingStatus::Completed));
    let Some(BackendCommand::SetStatus { request }) = drain(&mut rx).pop() else {
        panic!("expected a status command");
    };

    app.handle_backend_event(BackendEvent::StatusSet {
        request,
        result: Err(server_error("set_status failed")),
    });
    assert_eq!(
        app.status_message.as_deref(),
        Some("Failed to update the reading status: set_status failed")
    );
    assert_eq!(app.library.paper(1).unwrap().status, ReadingStatus::Unread);
}

#[test]
fn same_status_sends_nothing() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::SetStatus(ReadingStatus::Unread));
    assert!(drain(&mut rx).is_empty());
}

// ── Delete ──────────────────────────────────────────────────────

#[test]
fn delete_needs_confirmation() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One"), paper(2, "Two")]);
    app.paper_cursor = 1;
    let target = app.selected_paper().unwrap().paper_id;

    app.update(Action::Delete);
    assert_eq!(app.confirm_delete, Some(DeleteTarget::Paper(target)));

    // Anything but `y` cancels.
    app.update(Action::MoveDown);
    assert_eq!(app.confirm_delete, None);
    assert!(drain(&mut rx).is_empty());

    app.update(Action::Delete);
    app.update(Action::Confirm);
    let Some(BackendCommand::DeletePaper { ticket, paper_id }) = drain(&mut rx).pop() else {
        panic!("expected a delete command");
    };
    assert_eq!(paper_id, target);

    app.handle_backend_event(BackendEvent::PaperDeleted {
        ticket,
        paper_id,
        result: Ok(()),
    });
    assert!(app.library.paper(target).is_none());
    assert_eq!(app.paper_cursor, 0);
}

#[test]
fn deleting_open_paper_closes_its_tab() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::Select);
    assert!(app.active_document().is_some());

    // Back on the list tab, delete it.
    app.update(Action::PrevTab);
    assert!(app.active_document().is_none());
    app.update(Action::Delete);
    app.update(Action::Confirm);
    let Some(BackendCommand::DeletePaper { ticket, paper_id }) = drain(&mut rx).pop() else {
        panic!("expected a delete command");
    };
    app.handle_backend_event(BackendEvent::PaperDeleted {
        ticket,
        paper_id,
        result: Ok(()),
    });
    assert_eq!(app.library.view().tabs.len(), 1);
}

// ── Add paper form ──────────────────────────────────────────────

#[test]
fn submitting_empty_form_shows_validation_message() {
    let (mut app, mut rx) = loaded_app(vec![]);
    app.update(Action::AddPaper);
    assert_eq!(app.input_mode, InputMode::Form);

    app.update(Action::Submit);
    assert!(
        app.status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Cannot add paper"))
    );
    assert!(drain(&mut rx).is_empty());
    assert!(app.form.is_some());
}

#[test]
fn created_paper_is_prepended_and_form_closes() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::AddPaper);
    type_text(&mut app, "/tmp/new.pdf");
    app.update(Action::NextField);
    type_text(&mut app, "Fresh Paper");
    app.update(Action::NextField);
    type_text(&mut app, "Grace Hopper, Alan Turing");
    app.update(Action::Submit);

    let Some(BackendCommand::CreatePaper { ticket, input }) = drain(&mut rx).pop() else {
        panic!("expected a create command");
    };
    assert_eq!(input.authors.len(), 2);

    app.handle_backend_event(BackendEvent::PaperCreated {
        ticket,
        input,
        result: Ok(papershelf_core::CreatedPaper {
            paper_id: 9,
            pdf_path: Some("uploads/new.pdf".to_string()),
        }),
    });
    assert!(app.form.is_none());
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.library.papers()[0].paper_id, 9);
}

#[test]
fn stale_extraction_is_ignored() {
    let (mut app, mut rx) = loaded_app(vec![]);
    app.update(Action::AddPaper);
    type_text(&mut app, "/tmp/a.pdf");
    app.update(Action::Extract);
    let Some(BackendCommand::Extract { ticket, .. }) = drain(&mut rx).pop() else {
        panic!("expected an extract command");
    };

    // Reopen the form; the old answer must not land in the new one.
    app.update(Action::Cancel);
    app.update(Action::AddPaper);
    app.handle_backend_event(BackendEvent::Extracted {
        ticket,
        result: Ok(papershelf_core::ExtractedMetadata {
            title: Some("Ghost".to_string()),
            ..Default::default()
        }),
    });
    assert_eq!(app.form.as_ref().unwrap().title, "");
}

// ── Search ──────────────────────────────────────────────────────

#[test]
fn search_filters_live_and_cancel_clears() {
    let (mut app, _rx) = loaded_app(vec![paper(1, "Graph Networks"), paper(2, "Transformers")]);
    app.update(Action::StartSearch);
    assert_eq!(app.input_mode, InputMode::TextInput);
    type_text(&mut app, "graph");
    assert_eq!(app.library.display().len(), 1);

    app.update(Action::Cancel);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.library.view().search_query, "");
    assert_eq!(app.library.display().len(), 2);
}

// ── Sidebar ─────────────────────────────────────────────────────

#[test]
fn sidebar_favourites_entry_enters_favourites_mode() {
    let (mut app, _rx) = loaded_app(vec![paper(1, "One")]);
    app.focus = Focus::Sidebar;
    app.sidebar_cursor = app
        .sidebar_entries()
        .iter()
        .position(|e| *e == SidebarEntry::Favourites)
        .unwrap();
    app.update(Action::Select);
    assert!(app.library.view().show_favorites_only);
    assert_eq!(app.focus, Focus::Papers);
    assert!(app.library.display().is_empty());
}

// ── Notes ───────────────────────────────────────────────────────

#[test]
fn highlight_prompts_for_quote_then_message() {
    let (mut app, _rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::Select);
    let (_, key) = app.active_document().unwrap();
    app.update(Action::NextPage);

    app.update(Action::Highlight);
    assert_eq!(app.text_target, Some(TextTarget::NoteQuote));
    type_text(&mut app, "a key sentence");
    app.update(Action::Submit);
    assert_eq!(app.text_target, Some(TextTarget::NoteMessage));

    // An empty message keeps the prompt open.
    app.update(Action::Submit);
    assert_eq!(app.text_target, Some(TextTarget::NoteMessage));

    type_text(&mut app, "remember this");
    app.update(Action::Submit);
    assert_eq!(app.input_mode, InputMode::Normal);

    let notes = app.notes.notes_for(&key);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].quote, "a key sentence");
    assert_eq!(notes[0].content, "remember this");
    assert_eq!(notes[0].highlight_areas[0].page_index, 1);
}

#[test]
fn note_delete_goes_through_confirmation() {
    let (mut app, _rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::Select);
    let (_, key) = app.active_document().unwrap();
    app.update(Action::Highlight);
    type_text(&mut app, "q");
    app.update(Action::Submit);
    type_text(&mut app, "m");
    app.update(Action::Submit);
    assert_eq!(app.notes.notes_for(&key).len(), 1);

    app.update(Action::Delete);
    assert!(matches!(app.confirm_delete, Some(DeleteTarget::Note { .. })));
    app.update(Action::Confirm);
    assert!(app.notes.notes_for(&key).is_empty());
}

fn add_note(app: &mut App, quote: &str, message: &str) {
    app.update(Action::Highlight);
    type_text(app, quote);
    app.update(Action::Submit);
    type_text(app, message);
    app.update(Action::Submit);
}

#[test]
fn clicking_a_highlight_selects_its_note() {
    let (mut app, _rx) = loaded_app(vec![paper(1, "One")]);
    app.screen = Rect::new(0, 0, 100, 30);
    app.update(Action::Select);
    let (_, key) = app.active_document().unwrap();
    add_note(&mut app, "first page", "a");
    app.update(Action::NextPage);
    add_note(&mut app, "second page", "b");
    app.update(Action::PrevPage);
    assert_eq!(app.note_cursor, 1);
    let first = app.notes.notes_for(&key)[0].id;

    // The notes pane is not part of the page.
    app.update(Action::Click(90, 10));
    assert_eq!(app.note_cursor, 1);

    app.update(Action::Click(10, 10));
    assert_eq!(app.note_cursor, 0);
    assert_eq!(app.focus, Focus::Notes);
    assert_eq!(app.overlays[&key].focused_note, Some(first));
}

// ── Chat ────────────────────────────────────────────────────────

#[test]
fn chat_question_round_trip() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::ToggleChat);
    assert_eq!(app.focus, Focus::Chat);

    app.update(Action::Select);
    type_text(&mut app, "what is this about?");
    app.update(Action::Submit);

    let Some(BackendCommand::Ask {
        ticket,
        paper_id,
        query,
        top_k,
    }) = drain(&mut rx).pop()
    else {
        panic!("expected an ask command");
    };
    assert_eq!(paper_id, None);
    assert_eq!(query, "what is this about?");
    assert_eq!(top_k, 2);
    assert!(app.chat_session().waiting);

    // A second question is refused while waiting.
    app.update(Action::Select);
    assert_eq!(app.input_mode, InputMode::Normal);

    app.handle_backend_event(BackendEvent::Answered {
        ticket,
        paper_id,
        result: Ok("It is about graphs.".to_string()),
    });
    let session = app.chat_session();
    assert!(!session.waiting);
    assert_eq!(session.messages.last().unwrap().text, "It is about graphs.");
}

// ── Collections ─────────────────────────────────────────────────

#[test]
fn collection_editor_saves_and_closes() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::EditCollections);
    let Some(BackendCommand::FetchMembership { ticket, paper_id }) = drain(&mut rx).pop() else {
        panic!("expected a membership fetch");
    };

    let mut membership = papershelf_core::Membership::new();
    membership.insert("ML".to_string(), 0);
    app.handle_backend_event(BackendEvent::MembershipLoaded {
        ticket,
        paper_id,
        result: Ok(membership),
    });
    assert!(app.editor.is_some());

    app.update(Action::ToggleItem);
    app.update(Action::Select);
    let Some(BackendCommand::SaveCollections {
        ticket, membership, ..
    }) = drain(&mut rx).pop()
    else {
        panic!("expected a save");
    };
    assert_eq!(membership.get("ML"), Some(&1));

    app.handle_backend_event(BackendEvent::CollectionsSaved {
        ticket,
        paper_id,
        outcome: SaveOutcome::Refreshed(membership),
    });
    assert!(app.editor.is_none());
    assert_eq!(app.library.paper(1).unwrap().collections, vec!["ML".to_string()]);
}

#[test]
fn saved_collections_close_editor_even_if_refetch_fails() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::EditCollections);
    let Some(BackendCommand::FetchMembership { ticket, paper_id }) = drain(&mut rx).pop() else {
        panic!("expected a membership fetch");
    };
    let membership: papershelf_core::Membership = [("ML".to_string(), 0)].into_iter().collect();
    app.handle_backend_event(BackendEvent::MembershipLoaded {
        ticket,
        paper_id,
        result: Ok(membership),
    });
    app.update(Action::ToggleItem);
    app.update(Action::Select);
    let Some(BackendCommand::SaveCollections {
        ticket, membership, ..
    }) = drain(&mut rx).pop()
    else {
        panic!("expected a save");
    };

    app.handle_backend_event(BackendEvent::CollectionsSaved {
        ticket,
        paper_id,
        outcome: SaveOutcome::Unrefreshed {
            submitted: membership,
            error: server_error("paper_collections failed"),
        },
    });
    assert!(app.editor.is_none());
    assert_eq!(
        app.status_message.as_deref(),
        Some("Collections saved; could not refresh: paper_collections failed")
    );
    assert_eq!(app.library.paper(1).unwrap().collections, vec!["ML".to_string()]);
}

// ── Modals ──────────────────────────────────────────────────────

#[test]
fn help_swallows_actions_until_closed() {
    let (mut app, mut rx) = loaded_app(vec![paper(1, "One")]);
    app.update(Action::ToggleHelp);
    app.update(Action::ToggleFavourite);
    assert!(drain(&mut rx).is_empty());
    app.update(Action::Back);
    assert!(!app.show_help);
}

#[test]
fn view_mode_and_sort_cycle() {
    let mut app = test_app();
    app.update(Action::CycleViewMode);
    assert_eq!(app.library.view().view_mode, papershelf_core::ViewMode::Compact);
    app.update(Action::CycleSort);
    assert_eq!(
        app.library.view().sort_order,
        papershelf_core::SortOrder::PublicationDate
    );
}
