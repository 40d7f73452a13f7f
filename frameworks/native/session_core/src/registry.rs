// Copyright (C) 2024 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Registry of in-flight tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use session_utils::task_id::TaskId;
use session_utils::{debug, error};

use crate::delegate::TaskRecord;

/// Associates every in-flight task with its [`TaskRecord`].
///
/// One mutex protects the map. Critical sections only touch the map itself:
/// no callback and no trust evaluation ever runs while it is held.
pub struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, Arc<TaskRecord>>>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Registers the record of a task.
    ///
    /// # Panics
    ///
    /// Panics if `task_id` already has a record. Registering a task twice is
    /// a programming error; the existing record is left untouched.
    pub fn register(&self, task_id: TaskId, record: Arc<TaskRecord>) {
        let mut tasks = self.lock();
        if tasks.contains_key(&task_id) {
            drop(tasks);
            error!("{} registered twice", task_id);
            panic!("task {} is already registered", task_id);
        }
        tasks.insert(task_id, record);
        debug!("{} registered", task_id);
    }

    /// Returns the record of a task, or `None` for unknown tasks.
    pub fn lookup(&self, task_id: TaskId) -> Option<Arc<TaskRecord>> {
        self.lock().get(&task_id).cloned()
    }

    /// Removes the record of a task. Removing an unknown task does nothing.
    pub fn unregister(&self, task_id: TaskId) -> Option<Arc<TaskRecord>> {
        let record = self.lock().remove(&task_id);
        if record.is_none() {
            debug!("{} unregister ignored, not registered", task_id);
        }
        record
    }

    /// Calls `f` for every registered task.
    ///
    /// The entries are copied under the lock and `f` runs after it is
    /// released, so `f` may call back into the registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(TaskId, &Arc<TaskRecord>),
    {
        let snapshot = self
            .lock()
            .iter()
            .map(|(task_id, record)| (*task_id, record.clone()))
            .collect::<Vec<_>>();
        for (task_id, record) in snapshot.iter() {
            f(*task_id, record);
        }
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Identifiers of the registered tasks in ascending order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids = self.lock().keys().copied().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, Arc<TaskRecord>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
