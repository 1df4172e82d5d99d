use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use papershelf_core::PaperRepository;

use crate::tui_event::{BackendCommand, BackendEvent, SaveOutcome};

/// Receive commands until the channel closes or `cancel` fires, running each
/// one as its own task so a slow request never blocks the next.
pub async fn listen(
    repo: Arc<dyn PaperRepository>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };
        let repo = Arc::clone(&repo);
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = execute(repo.as_ref(), cmd).await;
            // The UI may already be gone on shutdown.
            let _ = tx.send(event);
        });
    }
    tracing::debug!("backend listener stopped");
}

/// Run a single command against the repository.
pub async fn execute(repo: &dyn PaperRepository, cmd: BackendCommand) -> BackendEvent {
    match cmd {
        BackendCommand::LoadPapers { ticket } => BackendEvent::PapersLoaded {
            ticket,
            result: repo.list_papers().await,
        },
        BackendCommand::LoadCollections { ticket } => BackendEvent::CollectionsLoaded {
            ticket,
            result: repo.list_collections().await,
        },
        BackendCommand::CreatePaper { ticket, input } => {
            let result = repo.create_paper(&input).await;
            BackendEvent::PaperCreated {
                ticket,
                input,
                result,
            }
        }
        BackendCommand::DeletePaper { ticket, paper_id } => BackendEvent::PaperDeleted {
            ticket,
            paper_id,
            result: repo.delete_paper(paper_id).await,
        },
        BackendCommand::SetFavourite { request } => {
            let result = repo.set_favourite(request.paper_id, request.favourite).await;
            BackendEvent::FavouriteSet { request, result }
        }
        BackendCommand::SetStatus { request } => {
            let result = repo.set_status(request.paper_id, request.status).await;
            BackendEvent::StatusSet { request, result }
        }
        BackendCommand::RefreshPaper { ticket, paper_id } => BackendEvent::PaperRefreshed {
            ticket,
            paper_id,
            result: repo.get_paper(paper_id).await,
        },
        BackendCommand::FetchMembership { ticket, paper_id } => BackendEvent::MembershipLoaded {
            ticket,
            paper_id,
            result: repo.paper_collections(paper_id).await,
        },
        BackendCommand::SaveCollections {
            ticket,
            paper_id,
            membership,
        } => {
            let outcome = match repo.set_collections(paper_id, &membership).await {
                Ok(()) => match repo.paper_collections(paper_id).await {
                    Ok(fresh) => SaveOutcome::Refreshed(fresh),
                    Err(error) => SaveOutcome::Unrefreshed {
                        submitted: membership,
                        error,
                    },
                },
                Err(e) => SaveOutcome::Failed(e),
            };
            BackendEvent::CollectionsSaved {
                ticket,
                paper_id,
                outcome,
            }
        }
        BackendCommand::AddCollection { collection } => BackendEvent::CollectionAdded {
            result: repo.add_collection(&collection).await,
        },
        BackendCommand::DeleteCollection { name } => {
            let result = repo.delete_collection(&name).await;
            BackendEvent::CollectionDeleted { name, result }
        }
        BackendCommand::Extract { ticket, path } => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "paper.pdf".to_string());
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => repo
                    .extract_metadata(&file_name, bytes)
                    .await
                    .map_err(|e| e.user_message()),
                Err(e) => Err(format!("could not read {}: {e}", path.display())),
            };
            BackendEvent::Extracted { ticket, result }
        }
        BackendCommand::Ask {
            ticket,
            paper_id,
            query,
            top_k,
        } => BackendEvent::Answered {
            ticket,
            paper_id,
            result: repo.ask_chatbot(&query, paper_id, top_k).await,
        },
    }
}
