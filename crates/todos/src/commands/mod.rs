use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use todos_app::{ErrorKind, RemoteStore, RenameOutcome, SyncState, TodoSync};
use todos_core::FilterStatus;
use todos_core::id::ItemId;

use crate::{Command, LsFormat};

/// Text printed by a one-shot command plus the error the core ended up reporting.
struct CommandOutput {
    text: String,
    error: Option<ErrorKind>,
}

/// Run a one-shot command: load, apply the operation, print the resulting list.
///
/// # Errors
/// Fails when the initial load fails, the id is malformed or unknown, or the
/// operation left an error in the session state.
pub async fn run<S: RemoteStore>(command: Command, sync: &TodoSync<S>) -> Result<()> {
    let output = execute(command, sync).await?;
    print!("{}", output.text);
    match output.error {
        Some(kind) => bail!("{kind}"),
        None => Ok(()),
    }
}

async fn execute<S: RemoteStore>(command: Command, sync: &TodoSync<S>) -> Result<CommandOutput> {
    sync.load().await;
    if let Some(kind) = sync.snapshot().error_kind() {
        bail!("{kind}");
    }

    let mut text = String::new();
    let mut format = LsFormat::Table;
    match command {
        Command::Ls { filter, format: requested } => {
            sync.set_filter(filter);
            format = requested;
        }
        Command::Add { title } => {
            if let Some(item) = sync.create(&title).await {
                writeln!(text, "created item {}", item.id)?;
            }
        }
        Command::Toggle { id } => {
            let id = existing_item(sync, &id)?;
            sync.toggle(id).await;
        }
        Command::ToggleAll => sync.toggle_all().await,
        Command::Rm { id } => {
            let id = existing_item(sync, &id)?;
            sync.remove(id).await;
        }
        Command::Rename { id, title } => {
            let id = existing_item(sync, &id)?;
            // Failures are recorded in the session error and reported below.
            if let Ok(outcome) = sync.rename(id, &title).await {
                writeln!(text, "{}", describe_rename(id, outcome))?;
            }
        }
        Command::ClearCompleted => sync.clear_completed().await,
        Command::Tui | Command::InitConfig { .. } => bail!("command is not a one-shot item command"),
    }

    let state = sync.snapshot();
    match format {
        LsFormat::Table => render_item_table(&mut text, &state)?,
        LsFormat::Json => {
            let visible: Vec<_> = state.visible_items().collect();
            writeln!(text, "{}", serde_json::to_string_pretty(&visible)?)?;
        }
    }

    Ok(CommandOutput {
        text,
        error: state.error_kind(),
    })
}

fn existing_item<S>(sync: &TodoSync<S>, raw: &str) -> Result<ItemId> {
    let id = parse_item_id(raw)?;
    if id.is_placeholder() || sync.snapshot().item(id).is_none() {
        bail!("no item with id {id}");
    }
    Ok(id)
}

fn parse_item_id(raw: &str) -> Result<ItemId> {
    ItemId::from_str(raw).with_context(|| format!("Invalid item id: {raw}"))
}

fn describe_rename(id: ItemId, outcome: RenameOutcome) -> String {
    match outcome {
        RenameOutcome::Renamed => format!("renamed item {id}"),
        RenameOutcome::Unchanged => format!("item {id} already has that title"),
        RenameOutcome::Deleted => format!("deleted item {id} (blank title)"),
        RenameOutcome::Missing => format!("no item with id {id}"),
    }
}

fn render_item_table(out: &mut String, state: &SyncState) -> Result<()> {
    let mut visible = state.visible_items().peekable();
    if visible.peek().is_none() {
        if state.items.is_empty() {
            writeln!(out, "No items found")?;
        } else {
            writeln!(out, "No items matched filter '{}'", state.filter)?;
        }
    } else {
        writeln!(out, "ID | Done | Title")?;
        writeln!(out, "-- | ---- | -----")?;
        for item in visible {
            let done = if item.completed { "[x]" } else { "[ ]" };
            writeln!(out, "{} | {} | {}", item.id, done, item.title)?;
        }
    }

    if !state.items.is_empty() {
        let counts = state.stats();
        let filters: Vec<String> = FilterStatus::ALL
            .iter()
            .map(|filter| {
                if *filter == state.filter {
                    format!("[{filter}]")
                } else {
                    filter.to_string()
                }
            })
            .collect();
        writeln!(out, "{} | {}", counts.items_left_label(), filters.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use thiserror::Error;
    use todos_app::SyncOptions;
    use todos_core::id::OwnerId;
    use todos_core::{Item, ItemPatch, NewItem};

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct MockError(String);

    #[derive(Clone, Default)]
    struct MockStore {
        inner: Arc<MockStoreInner>,
    }

    #[derive(Default)]
    struct MockStoreInner {
        items: Mutex<Vec<Item>>,
        fail_ids: Mutex<HashSet<ItemId>>,
        fail_list: Mutex<bool>,
        deleted: Mutex<Vec<ItemId>>,
    }

    impl MockStore {
        fn with_items(items: Vec<Item>) -> Self {
            let store = Self::default();
            *guard(&store.inner.items) = items;
            store
        }

        fn fail_on(&self, id: ItemId) {
            guard(&self.inner.fail_ids).insert(id);
        }

        fn deleted(&self) -> Vec<ItemId> {
            guard(&self.inner.deleted).clone()
        }

        fn check(&self, id: ItemId) -> Result<(), MockError> {
            if guard(&self.inner.fail_ids).contains(&id) {
                return Err(MockError(format!("rejected {id}")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteStore for MockStore {
        type Error = MockError;

        async fn list(&self, _owner: OwnerId) -> Result<Vec<Item>, Self::Error> {
            if *guard(&self.inner.fail_list) {
                return Err(MockError("offline".into()));
            }
            Ok(guard(&self.inner.items).clone())
        }

        async fn create(&self, item: &NewItem) -> Result<Item, Self::Error> {
            let mut items = guard(&self.inner.items);
            let id = ItemId(items.iter().map(|item| item.id.0).max().unwrap_or(0) + 1);
            let created = Item {
                id,
                owner_id: item.owner_id,
                title: item.title.clone(),
                completed: item.completed,
            };
            items.push(created.clone());
            drop(items);
            Ok(created)
        }

        async fn delete(&self, id: ItemId) -> Result<(), Self::Error> {
            self.check(id)?;
            guard(&self.inner.deleted).push(id);
            guard(&self.inner.items).retain(|item| item.id != id);
            Ok(())
        }

        async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Item, Self::Error> {
            self.check(id)?;
            let mut items = guard(&self.inner.items);
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| MockError(format!("missing {id}")))?;
            item.apply(patch);
            let updated = item.clone();
            drop(items);
            Ok(updated)
        }
    }

    fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn owner() -> OwnerId {
        OwnerId::new(3090).unwrap_or_else(|| unreachable!("non-zero literal"))
    }

    fn item(id: u64, title: &str, completed: bool) -> Item {
        Item {
            id: ItemId(id),
            owner_id: owner(),
            title: title.to_owned(),
            completed,
        }
    }

    fn sync_over(store: &MockStore) -> TodoSync<MockStore> {
        TodoSync::new(store.clone(), owner(), SyncOptions::default())
    }

    fn sample() -> MockStore {
        MockStore::with_items(vec![item(1, "Walk", true), item(2, "Read", false)])
    }

    #[tokio::test]
    async fn ls_renders_table_with_footer() -> Result<()> {
        let store = sample();
        let output = execute(
            Command::Ls {
                filter: FilterStatus::All,
                format: LsFormat::Table,
            },
            &sync_over(&store),
        )
        .await?;

        assert_eq!(
            output.text,
            "ID | Done | Title\n-- | ---- | -----\n1 | [x] | Walk\n2 | [ ] | Read\n1 items left | [All] Active Completed\n"
        );
        assert!(output.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn ls_applies_filter_and_json_format() -> Result<()> {
        let store = sample();
        let output = execute(
            Command::Ls {
                filter: FilterStatus::Completed,
                format: LsFormat::Json,
            },
            &sync_over(&store),
        )
        .await?;

        let parsed: Vec<Item> = serde_json::from_str(&output.text)?;
        assert_eq!(parsed, vec![item(1, "Walk", true)]);
        Ok(())
    }

    #[tokio::test]
    async fn add_with_blank_title_reports_validation_error() -> Result<()> {
        let store = sample();
        let output = execute(Command::Add { title: "   ".into() }, &sync_over(&store)).await?;

        assert_eq!(output.error, Some(ErrorKind::ValidationFailure));
        assert!(!output.text.contains("created item"));
        Ok(())
    }

    #[tokio::test]
    async fn add_prints_created_id() -> Result<()> {
        let store = sample();
        let output = execute(Command::Add { title: " Cook ".into() }, &sync_over(&store)).await?;

        assert!(output.text.starts_with("created item 3\n"));
        assert!(output.text.contains("3 | [ ] | Cook"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_are_rejected() {
        let store = sample();
        let err = execute(Command::Toggle { id: "9".into() }, &sync_over(&store))
            .await
            .err()
            .unwrap_or_else(|| panic!("unknown id must fail"));
        assert_eq!(err.to_string(), "no item with id 9");

        let err = execute(Command::Rm { id: "abc".into() }, &sync_over(&store))
            .await
            .err()
            .unwrap_or_else(|| panic!("malformed id must fail"));
        assert!(err.to_string().contains("Invalid item id"));
    }

    #[tokio::test]
    async fn clear_completed_reports_partial_failure() -> Result<()> {
        let store = MockStore::with_items(vec![item(1, "A", true), item(2, "B", false), item(3, "C", true)]);
        store.fail_on(ItemId(3));
        let output = execute(Command::ClearCompleted, &sync_over(&store)).await?;

        assert_eq!(store.deleted(), vec![ItemId(1)]);
        assert_eq!(output.error, Some(ErrorKind::DeleteFailure));
        assert!(output.text.contains("2 | [ ] | B"));
        assert!(output.text.contains("3 | [x] | C"));
        Ok(())
    }

    #[tokio::test]
    async fn rename_with_blank_title_deletes() -> Result<()> {
        let store = sample();
        let output = execute(
            Command::Rename {
                id: "2".into(),
                title: " ".into(),
            },
            &sync_over(&store),
        )
        .await?;

        assert!(output.text.starts_with("deleted item 2 (blank title)\n"));
        assert_eq!(store.deleted(), vec![ItemId(2)]);
        Ok(())
    }

    #[tokio::test]
    async fn load_failure_aborts_command() {
        let store = sample();
        *guard(&store.inner.fail_list) = true;

        let err = execute(Command::ToggleAll, &sync_over(&store))
            .await
            .err()
            .unwrap_or_else(|| panic!("load failure must abort"));
        assert_eq!(err.to_string(), "Unable to load todos");
    }

    #[test]
    fn empty_filter_result_is_explained() -> Result<()> {
        let state = SyncState {
            items: vec![item(1, "Walk", false)],
            filter: FilterStatus::Completed,
            ..SyncState::default()
        };
        let mut out = String::new();
        render_item_table(&mut out, &state)?;

        assert_eq!(
            out,
            "No items matched filter 'Completed'\n1 items left | All Active [Completed]\n"
        );
        Ok(())
    }
}
