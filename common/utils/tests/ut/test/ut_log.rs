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

use super::*;

// @tc.name: ut_log_init_repeated
// @tc.desc: Test log initialization can be called more than once
// @tc.precon: NA
// @tc.step: 1. Call init() twice
//           2. Emit a debug message
// @tc.expect: No panic occurs on the second initialization
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_log_init_repeated() {
    init();
    init();
    ::log::debug!("Test log message");
}
