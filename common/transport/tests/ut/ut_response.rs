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

fn url() -> Url {
    Url::parse("https://example.com/file").unwrap()
}

// @tc.name: ut_response_headers_001
// @tc.desc: Test header names are matched case-insensitively
// @tc.precon: NA
// @tc.step: 1. Create a response with mixed-case header names
//           2. Query headers with different case
// @tc.expect: Values are found regardless of case and keys are stored lowercase
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_response_headers_001() {
    let response = Response::new(url(), 200, [("Content-Type", "text/html"), ("ETag", "\"v1\"")]);
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.header("ETAG"), Some("\"v1\""));
    assert!(response.headers().contains_key("etag"));
    assert_eq!(response.header("missing"), None);
    assert_eq!(response.url(), &url());
}

// @tc.name: ut_response_status_001
// @tc.desc: Test is_success for several status codes
// @tc.precon: NA
// @tc.step: 1. Create responses with status 200, 204, 304, 404 and 500
// @tc.expect: Only 2xx responses are successful
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_response_status_001() {
    let no_headers: [(&str, &str); 0] = [];
    for (status, success) in [(200, true), (204, true), (304, false), (404, false), (500, false)] {
        let response = Response::new(url(), status, no_headers);
        assert_eq!(response.status(), status);
        assert_eq!(response.is_success(), success);
    }
}

// @tc.name: ut_response_content_length_001
// @tc.desc: Test content_length parsing
// @tc.precon: NA
// @tc.step: 1. Create a response with a content-length header
//           2. Create a chunked response with a content-length header
//           3. Create a response with an invalid content-length header
// @tc.expect: Length only for step 1, None for the others
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_response_content_length_001() {
    let response = Response::new(url(), 200, [("Content-Length", " 1024 ")]);
    assert_eq!(response.content_length(), Some(1024));

    let response = Response::new(
        url(),
        200,
        [("Content-Length", "1024"), ("Transfer-Encoding", "Chunked")],
    );
    assert_eq!(response.content_length(), None);

    let response = Response::new(url(), 200, [("Content-Length", "abc")]);
    assert_eq!(response.content_length(), None);
}
