use fs2::FileExt;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::day::Day;
use crate::error::{Error, Result};
use crate::types::{record_id, Task, MAX_TASKS};

const SHAPE_HINT: &str = "expected an array of tasks or {\"tasks\": [...]}";

/// Tasks loaded from a directory, with the file each one came from
#[derive(Debug, Default)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub sources: Vec<PathBuf>,
}

impl LoadedTasks {
    pub fn source_of(&self, id: &str) -> Option<&Path> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .map(|i| self.sources[i].as_path())
    }
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path) -> impl Fn(serde_json::Error) -> Error + '_ {
    move |source| Error::Json {
        path: path.to_path_buf(),
        source,
    }
}

fn shape_error(path: &Path) -> Error {
    Error::InvalidTaskFile {
        path: path.to_path_buf(),
        reason: SHAPE_HINT.to_string(),
    }
}

/// Accepted task file shapes: a bare array or `{"tasks": [...]}`
fn into_records(root: Value) -> Option<Vec<Value>> {
    match root {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("tasks")? {
            Value::Array(items) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn records_mut(root: &mut Value) -> Option<&mut Vec<Value>> {
    match root {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get_mut("tasks")?.as_array_mut(),
        _ => None,
    }
}

/// Read one task file
///
/// Records are read one by one: a record that cannot be read at all (no
/// usable id, wrong type) is skipped with a warning and the rest of the
/// file still loads. Badly typed dates, rules and completion states are
/// already tolerated by `Task` itself.
pub fn load_file(path: &Path) -> Result<Vec<Task>> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let root: Value = serde_json::from_str(&content).map_err(json_error(path))?;
    let records = into_records(root).ok_or_else(|| shape_error(path))?;

    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Task>(record) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                tracing::warn!(path = %path.display(), index, %err, "skipping unreadable task record");
            }
        }
    }
    Ok(tasks)
}

/// Toggle the occurrence of task `id` on `day` inside its file
///
/// The file is held under an exclusive lock from read to write, so
/// concurrent toggles against the same file are applied one after the
/// other instead of overwriting each other. Only the completion key of the
/// matching record is replaced; every other record and field is written
/// back as it was read.
///
/// # Returns
/// The task after the toggle
pub fn toggle_in_file(path: &Path, id: &str, day: Day) -> Result<Task> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(io_error(path))?;
    file.lock_exclusive().map_err(io_error(path))?;

    // the lock is released when `file` is closed
    let toggled = toggle_locked(&mut file, path, id, day)?;
    tracing::debug!(path = %path.display(), id, %day, "toggled completion in file");
    Ok(toggled)
}

fn toggle_locked(file: &mut File, path: &Path, id: &str, day: Day) -> Result<Task> {
    let mut content = String::new();
    file.read_to_string(&mut content).map_err(io_error(path))?;
    let mut root: Value = serde_json::from_str(&content).map_err(json_error(path))?;

    let records = records_mut(&mut root).ok_or_else(|| shape_error(path))?;
    let mut matching = records
        .iter_mut()
        .filter(|r| record_id(r).as_deref() == Some(id));
    let record = matching
        .next()
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
    if matching.next().is_some() {
        return Err(Error::DuplicateId(id.to_string()));
    }

    let task: Task = serde_json::from_value(record.clone()).map_err(json_error(path))?;
    let toggled = task.toggle_completion(day);

    let key = if record.get("completionState").is_none() && record.get("completed").is_some() {
        "completed"
    } else {
        "completionState"
    };
    let state = serde_json::to_value(&toggled.completion_state)?;
    if let Some(fields) = record.as_object_mut() {
        fields.insert(key.to_string(), state);
    }

    let json = serde_json::to_string_pretty(&root)?;
    file.set_len(0).map_err(io_error(path))?;
    file.seek(SeekFrom::Start(0)).map_err(io_error(path))?;
    file.write_all(json.as_bytes()).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))?;

    Ok(toggled)
}

/// Load every task file under `dir` matching `glob`
///
/// Files are visited in name order. A file that cannot be read or parsed
/// is skipped with a warning so one bad file does not hide the rest.
/// Loading stops at [`MAX_TASKS`].
pub fn load_dir(dir: &Path, glob: &str) -> Result<LoadedTasks> {
    let mut overrides = OverrideBuilder::new(dir);
    overrides.add(glob).map_err(|source| Error::Glob {
        pattern: glob.to_string(),
        source,
    })?;
    let overrides = overrides.build().map_err(|source| Error::Glob {
        pattern: glob.to_string(),
        source,
    })?;

    let walker = WalkBuilder::new(dir)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut loaded = LoadedTasks::default();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();

        let tasks = match load_file(path) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(%err, "skipping task file");
                continue;
            }
        };
        tracing::debug!(path = %path.display(), count = tasks.len(), "loaded task file");

        for task in tasks {
            if loaded.tasks.len() >= MAX_TASKS {
                tracing::warn!(limit = MAX_TASKS, path = %path.display(), "reached maximum task limit");
                return Ok(loaded);
            }
            loaded.tasks.push(task);
            loaded.sources.push(path.to_path_buf());
        }
    }

    Ok(loaded)
}
