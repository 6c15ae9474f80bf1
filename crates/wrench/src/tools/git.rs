use git2::build::CheckoutBuilder;
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, IndexAddOption, Oid, PushOptions,
    RemoteCallbacks, Repository, Signature, Status, StatusOptions,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_arguments, require_path};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;
use crate::registry::{ToolDefinition, Workspace};

const REMOTE: &str = "origin";
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
struct GitAddInput {
    path: String,
}

#[derive(Debug, Deserialize)]
struct GitCommitInput {
    message: String,
}

fn no_parameters() -> Value {
    json!({"type": "object", "required": [], "properties": {}})
}

pub fn status_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "git_status",
            "Show the working tree status, including staged, unstaged and untracked files",
            no_parameters(),
        ),
        git_status,
    )
}

pub fn add_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "git_add",
            "Stage changes for commit",
            json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path of file(s) to stage. Use '.' for all files"
                    }
                }
            }),
        ),
        git_add,
    )
}

pub fn commit_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "git_commit",
            "Commit staged changes",
            json!({
                "type": "object",
                "required": ["message"],
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Commit message"
                    }
                }
            }),
        ),
        git_commit,
    )
}

pub fn push_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "git_push",
            "Push commits to remote repository",
            no_parameters(),
        ),
        git_push,
    )
}

pub fn pull_definition() -> ToolDefinition {
    ToolDefinition::new(
        Tool::new(
            "git_pull",
            "Pull changes from remote repository",
            no_parameters(),
        ),
        git_pull,
    )
}

fn failure(context: &str, err: git2::Error) -> AgentError {
    AgentError::ExecutionError(format!("{}: {}", context, err.message()))
}

fn open(workspace: &Workspace) -> AgentResult<Repository> {
    Repository::open(workspace.root()).map_err(|e| failure("failed to open repository", e))
}

/// Name and tip of the checked out branch
fn current_branch(repo: &Repository) -> AgentResult<(String, Oid)> {
    let head = repo.head().map_err(|e| failure("failed to resolve HEAD", e))?;
    if !head.is_branch() {
        return Err(AgentError::ExecutionError(
            "HEAD is detached, check out a branch first".into(),
        ));
    }

    let name = head
        .shorthand()
        .ok_or_else(|| AgentError::ExecutionError("branch name is not valid UTF-8".into()))?
        .to_string();
    let oid = head
        .target()
        .ok_or_else(|| AgentError::ExecutionError("HEAD does not point at a commit".into()))?;
    Ok((name, oid))
}

fn remote_callbacks<'a>(repo: &Repository) -> RemoteCallbacks<'a> {
    let config = repo.config().ok();
    let mut attempts = 0;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(config) = &config {
                return Cred::credential_helper(config, url, username_from_url);
            }
        }
        Cred::default()
    });
    callbacks
}

/// Two-letter porcelain code for a status entry
fn status_code(status: Status) -> String {
    if status.is_conflicted() {
        return "UU".to_string();
    }
    if status.is_wt_new() {
        return "??".to_string();
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };
    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };
    format!("{}{}", index, worktree)
}

pub fn git_status(workspace: &Workspace, _arguments: Value) -> AgentResult<String> {
    let repo = open(workspace)?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);
    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(|e| failure("failed to get status", e))?;

    let lines: Vec<String> = statuses
        .iter()
        .map(|entry| {
            format!(
                "{} {}",
                status_code(entry.status()),
                entry.path().unwrap_or("<invalid utf-8 path>")
            )
        })
        .collect();

    if lines.is_empty() {
        return Ok("nothing to commit, working tree clean".to_string());
    }
    Ok(lines.join("\n"))
}

pub fn git_add(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: GitAddInput = parse_arguments(arguments)?;
    require_path(&input.path)?;

    let pathspec = match input.path.as_str() {
        "." | "./" => "*",
        path => path,
    };

    let repo = open(workspace)?;
    let mut index = repo.index().map_err(|e| failure("failed to get index", e))?;
    index
        .add_all([pathspec].iter(), IndexAddOption::DEFAULT, None)
        .map_err(|e| failure("failed to add files", e))?;
    // add_all only picks up new and modified files, deletions need update_all
    index
        .update_all([pathspec].iter(), None)
        .map_err(|e| failure("failed to add files", e))?;
    index.write().map_err(|e| failure("failed to write index", e))?;

    Ok(format!("Successfully staged changes for: {}", input.path))
}

pub fn git_commit(workspace: &Workspace, arguments: Value) -> AgentResult<String> {
    let input: GitCommitInput = parse_arguments(arguments)?;
    if input.message.trim().is_empty() {
        return Err(AgentError::InvalidParameters(
            "commit message cannot be empty".into(),
        ));
    }

    let repo = open(workspace)?;
    let mut index = repo.index().map_err(|e| failure("failed to get index", e))?;
    let tree_id = index
        .write_tree()
        .map_err(|e| failure("failed to write tree", e))?;
    let tree = repo
        .find_tree(tree_id)
        .map_err(|e| failure("failed to find tree", e))?;

    let author = workspace.author();
    let signature = Signature::now(&author.name, &author.email)
        .map_err(|e| failure("failed to build signature", e))?;

    let parent = match repo.head() {
        Ok(head) => Some(
            head.peel_to_commit()
                .map_err(|e| failure("failed to resolve HEAD", e))?,
        ),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(failure("failed to resolve HEAD", e)),
    };
    let parents: Vec<_> = parent.iter().collect();

    let oid = repo
        .commit(
            Some("HEAD"),
            &signature,
            &signature,
            &input.message,
            &tree,
            &parents,
        )
        .map_err(|e| failure("failed to commit", e))?;

    tracing::info!(commit = %oid, "created commit");
    Ok(format!("Successfully created commit: {}", oid))
}

pub fn git_push(workspace: &Workspace, _arguments: Value) -> AgentResult<String> {
    let repo = open(workspace)?;
    let (branch, local) = current_branch(&repo)?;
    let refname = format!("refs/heads/{}", branch);

    let mut remote = repo
        .find_remote(REMOTE)
        .map_err(|e| failure("failed to find remote", e))?;

    let refspec = format!("{}:{}", refname, refname);
    let mut up_to_date = false;
    let mut rejection = None;
    {
        let mut callbacks = remote_callbacks(&repo);
        // The negotiated updates carry the remote's current tip, zero when the ref is missing
        callbacks.push_negotiation(|updates| {
            up_to_date = !updates.is_empty() && updates.iter().all(|u| u.src() == u.dst());
            Ok(())
        });
        callbacks.push_update_reference(|reference, status| {
            if let Some(status) = status {
                rejection = Some(format!("{} rejected: {}", reference, status));
            }
            Ok(())
        });
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(|e| failure("failed to push", e))?;
    }
    if let Some(reason) = rejection {
        return Err(AgentError::ExecutionError(format!("failed to push: {}", reason)));
    }

    if up_to_date {
        return Ok("Everything up-to-date".to_string());
    }

    tracing::info!(branch = %branch, commit = %local, "pushed to {}", REMOTE);
    Ok("Successfully pushed changes to remote".to_string())
}

pub fn git_pull(workspace: &Workspace, _arguments: Value) -> AgentResult<String> {
    let repo = open(workspace)?;
    let (branch, _) = current_branch(&repo)?;

    let mut remote = repo
        .find_remote(REMOTE)
        .map_err(|e| failure("failed to find remote", e))?;
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks(&repo));
    remote
        .fetch(&[branch.as_str()], Some(&mut options), None)
        .map_err(|e| failure("failed to pull", e))?;

    let fetch_head = repo
        .find_reference("FETCH_HEAD")
        .map_err(|e| failure("failed to pull", e))?;
    let incoming = repo
        .reference_to_annotated_commit(&fetch_head)
        .map_err(|e| failure("failed to pull", e))?;
    let (analysis, _) = repo
        .merge_analysis(&[&incoming])
        .map_err(|e| failure("failed to pull", e))?;

    if analysis.is_up_to_date() {
        return Ok("Already up-to-date".to_string());
    }
    if !analysis.is_fast_forward() {
        return Err(AgentError::ExecutionError(
            "failed to pull: non-fast-forward update".into(),
        ));
    }

    // Check out first so local changes that would be overwritten stop the pull before the
    // branch moves
    let target = repo
        .find_object(incoming.id(), None)
        .map_err(|e| failure("failed to pull", e))?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
        .map_err(|e| failure("failed to pull", e))?;

    let refname = format!("refs/heads/{}", branch);
    let mut reference = repo
        .find_reference(&refname)
        .map_err(|e| failure("failed to pull", e))?;
    reference
        .set_target(incoming.id(), "pull: fast-forward")
        .map_err(|e| failure("failed to pull", e))?;
    repo.set_head(&refname)
        .map_err(|e| failure("failed to pull", e))?;

    tracing::info!(branch = %branch, commit = %incoming.id(), "fast-forwarded");
    Ok("Successfully pulled changes from remote".to_string())
}
