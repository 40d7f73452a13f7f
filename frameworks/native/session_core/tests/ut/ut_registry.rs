// Copyright (C) 2025 Huawei Device Co., Ltd.
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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use url::Url;

use super::*;
use crate::delegate::{TaskInfo, TaskKind};

fn record(id: u64) -> Arc<TaskRecord> {
    let info = TaskInfo::new(
        TaskId::new(id),
        TaskKind::Data,
        "GET",
        Url::parse("https://example.com/").unwrap(),
    );
    Arc::new(TaskRecord::new(info, |_| {}))
}

// @tc.name: ut_registry_register_lookup_001
// @tc.desc: Test register, lookup and unregister of one task
// @tc.precon: NA
// @tc.step: 1. Register a record
//           2. Look it up
//           3. Unregister it and look it up again
// @tc.expect: The same record is found until it is unregistered
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_registry_register_lookup_001() {
    let registry = TaskRegistry::new();
    let task_id = TaskId::new(1);
    let record = record(1);
    registry.register(task_id, record.clone());

    let found = registry.lookup(task_id).unwrap();
    assert!(Arc::ptr_eq(&found, &record));
    assert_eq!(registry.len(), 1);

    let removed = registry.unregister(task_id).unwrap();
    assert!(Arc::ptr_eq(&removed, &record));
    assert!(registry.lookup(task_id).is_none());
    assert!(registry.is_empty());
}

// @tc.name: ut_registry_lookup_unknown_001
// @tc.desc: Test lookup of a task that was never registered
// @tc.precon: NA
// @tc.step: 1. Look up an unknown id in an empty registry
// @tc.expect: None is returned without panic
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_registry_lookup_unknown_001() {
    let registry = TaskRegistry::new();
    assert!(registry.lookup(TaskId::new(404)).is_none());
}

// @tc.name: ut_registry_register_twice_001
// @tc.desc: Test registering the same task id twice
// @tc.precon: NA
// @tc.step: 1. Register a record
//           2. Register another record with the same id
// @tc.expect: The second registration panics
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
#[should_panic(expected = "already registered")]
fn ut_registry_register_twice_001() {
    let registry = TaskRegistry::new();
    registry.register(TaskId::new(7), record(7));
    registry.register(TaskId::new(7), record(7));
}

// @tc.name: ut_registry_register_twice_002
// @tc.desc: Test a rejected double registration keeps the first record
// @tc.precon: NA
// @tc.step: 1. Register a record
//           2. Catch the panic of a second registration
//           3. Look up the id
// @tc.expect: The first record is still registered and the registry is usable
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_registry_register_twice_002() {
    let registry = Arc::new(TaskRegistry::new());
    let first = record(7);
    registry.register(TaskId::new(7), first.clone());

    let clone = registry.clone();
    let result = thread::spawn(move || clone.register(TaskId::new(7), record(7))).join();
    assert!(result.is_err());

    let found = registry.lookup(TaskId::new(7)).unwrap();
    assert!(Arc::ptr_eq(&found, &first));
    assert_eq!(registry.len(), 1);
}

// @tc.name: ut_registry_unregister_twice_001
// @tc.desc: Test unregistering the same task twice in a row
// @tc.precon: A task is registered
// @tc.step: 1. Unregister the task
//           2. Unregister it again
// @tc.expect: The second call is a silent no-op
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_registry_unregister_twice_001() {
    let registry = TaskRegistry::new();
    registry.register(TaskId::new(3), record(3));
    assert!(registry.unregister(TaskId::new(3)).is_some());
    assert!(registry.unregister(TaskId::new(3)).is_none());
    assert!(registry.is_empty());
}

// @tc.name: ut_registry_for_each_reentrant_001
// @tc.desc: Test for_each callbacks may call back into the registry
// @tc.precon: Three tasks are registered
// @tc.step: 1. Iterate with a callback that looks up and unregisters the current task
// @tc.expect: No deadlock, every task visited once and the registry is empty
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_registry_for_each_reentrant_001() {
    let registry = TaskRegistry::new();
    for id in 1..=3 {
        registry.register(TaskId::new(id), record(id));
    }
    let mut visited = Vec::new();
    registry.for_each(|task_id, record| {
        assert_eq!(record.info().task_id(), task_id);
        assert!(registry.lookup(task_id).is_some());
        registry.unregister(task_id);
        visited.push(task_id);
    });
    visited.sort();
    assert_eq!(visited, vec![TaskId::new(1), TaskId::new(2), TaskId::new(3)]);
    assert!(registry.is_empty());
}

// @tc.name: ut_registry_task_ids_001
// @tc.desc: Test listing registered task ids
// @tc.precon: NA
// @tc.step: 1. Register tasks out of order
//           2. List the ids
// @tc.expect: Ids are returned in ascending order
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_registry_task_ids_001() {
    let registry = TaskRegistry::default();
    for id in [5, 1, 3] {
        registry.register(TaskId::new(id), record(id));
    }
    assert_eq!(
        registry.task_ids(),
        vec![TaskId::new(1), TaskId::new(3), TaskId::new(5)]
    );
}

// @tc.name: ut_registry_concurrent_001
// @tc.desc: Test concurrent register, lookup and unregister from many threads
// @tc.precon: NA
// @tc.step: 1. Spawn 8 threads, each registering, looking up and unregistering 500 own ids
//           2. Meanwhile a reader thread looks up random ids
// @tc.expect: Every own lookup succeeds, every unregister returns the record, the registry ends empty
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_registry_concurrent_001() {
    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 500;
    let registry = Arc::new(TaskRegistry::new());
    let found = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for t in 0..THREADS {
        let registry = registry.clone();
        let found = found.clone();
        handles.push(thread::spawn(move || {
            for i in 0..PER_THREAD {
                let id = t * PER_THREAD + i;
                let record = record(id);
                registry.register(TaskId::new(id), record.clone());
                let looked_up = registry.lookup(TaskId::new(id)).unwrap();
                assert!(Arc::ptr_eq(&looked_up, &record));
                found.fetch_add(1, Ordering::Relaxed);
            }
            for i in 0..PER_THREAD {
                let id = t * PER_THREAD + i;
                let removed = registry.unregister(TaskId::new(id)).unwrap();
                assert_eq!(removed.info().task_id(), TaskId::new(id));
            }
        }));
    }
    let reader = {
        let registry = registry.clone();
        thread::spawn(move || {
            for id in 0..(THREADS * PER_THREAD) {
                if let Some(record) = registry.lookup(TaskId::new(id)) {
                    assert_eq!(record.info().task_id(), TaskId::new(id));
                }
            }
        })
    };
    for handle in handles {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(found.load(Ordering::Relaxed) as u64, THREADS * PER_THREAD);
    assert!(registry.is_empty());
}
