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

use crate::test::certs::{key, TestCa};

use super::*;

// @tc.name: ut_system_trust_valid_001
// @tc.desc: Test a leaf issued directly by an anchor
// @tc.precon: NA
// @tc.step: 1. Verify a leaf for www.example.com against its root
// @tc.expect: Verification succeeds
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_system_trust_valid_001() {
    let root = TestCa::root("System Root");
    let leaf = root.issue(&key(), &["www.example.com"], 1);
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);
    assert_eq!(trust.verify(&[leaf], "www.example.com"), Ok(()));
}

// @tc.name: ut_system_trust_intermediate_001
// @tc.desc: Test a chain through an intermediate
// @tc.precon: NA
// @tc.step: 1. Verify leaf plus intermediate against the root
//           2. Verify the leaf without its intermediate
// @tc.expect: Step 1 succeeds, step 2 fails with UntrustedIssuer
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_intermediate_001() {
    let root = TestCa::root("System Root");
    let intermediate = root.intermediate("System Intermediate");
    let leaf = intermediate.issue(&key(), &["www.example.com"], 1);
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);

    assert_eq!(
        trust.verify(&[leaf.clone(), intermediate.der()], "www.example.com"),
        Ok(())
    );
    assert_eq!(
        trust.verify(&[leaf], "www.example.com"),
        Err(RejectReason::UntrustedIssuer)
    );
}

// @tc.name: ut_system_trust_untrusted_001
// @tc.desc: Test a chain from an unknown root
// @tc.precon: NA
// @tc.step: 1. Verify a leaf of another root with the same name
//           2. Verify it with the default verifier
// @tc.expect: Both fail with UntrustedIssuer
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_untrusted_001() {
    let root = TestCa::root("System Root");
    let rogue = TestCa::root("System Root");
    let leaf = rogue.issue(&key(), &["www.example.com"], 1);
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);
    assert_eq!(
        trust.verify(&[leaf.clone(), rogue.der()], "www.example.com"),
        Err(RejectReason::UntrustedIssuer)
    );
    assert_eq!(
        WebPkiSystemTrust::default().verify(&[leaf], "www.example.com"),
        Err(RejectReason::UntrustedIssuer)
    );
}

// @tc.name: ut_system_trust_default_roots_001
// @tc.desc: Test the default verifier trusts the Mozilla root program
// @tc.precon: NA
// @tc.step: 1. Create the default verifier
//           2. Add a private root and verify a leaf it issued
// @tc.expect: Every Mozilla root is loaded, the added root extends them and the leaf passes
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_system_trust_default_roots_001() {
    let mozilla = webpki_roots::TLS_SERVER_ROOTS.len();
    assert!(mozilla > 0);
    assert_eq!(WebPkiSystemTrust::default().anchor_count(), mozilla);

    let root = TestCa::root("Private Root");
    let trust = WebPkiSystemTrust::default().with_anchors(&[root.certificate()]);
    assert_eq!(trust.anchor_count(), mozilla + 1);
    let leaf = root.issue(&key(), &["www.example.com"], 1);
    assert_eq!(trust.verify(&[leaf, root.der()], "www.example.com"), Ok(()));
}

// @tc.name: ut_system_trust_purpose_001
// @tc.desc: Test a leaf restricted to client authentication
// @tc.precon: NA
// @tc.step: 1. Verify a leaf whose only extended key usage is ClientAuth
// @tc.expect: Verification fails with InvalidPurpose
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_purpose_001() {
    let root = TestCa::root("System Root");
    let leaf = root.issue_client_only(&key(), &["www.example.com"]);
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);
    assert_eq!(
        trust.verify(&[leaf], "www.example.com"),
        Err(RejectReason::InvalidPurpose)
    );
}

// @tc.name: ut_system_trust_path_len_001
// @tc.desc: Test the path length constraint of an anchor
// @tc.precon: NA
// @tc.step: 1. Verify a leaf issued through an intermediate of a root with pathLen 0
//           2. Verify a leaf issued directly by that root
// @tc.expect: Step 1 fails with UntrustedIssuer, step 2 succeeds
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_path_len_001() {
    let root = TestCa::root_with_path_len("Constrained Root", 0);
    let intermediate = root.intermediate("Forbidden Intermediate");
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);

    let leaf = intermediate.issue(&key(), &["www.example.com"], 1);
    assert_eq!(
        trust.verify(&[leaf, intermediate.der()], "www.example.com"),
        Err(RejectReason::UntrustedIssuer)
    );
    let direct = root.issue(&key(), &["www.example.com"], 2);
    assert_eq!(trust.verify(&[direct], "www.example.com"), Ok(()));
}

// @tc.name: ut_system_trust_expired_001
// @tc.desc: Test an expired leaf
// @tc.precon: NA
// @tc.step: 1. Verify a leaf that expired in 2001
// @tc.expect: Verification fails with Expired
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_expired_001() {
    let root = TestCa::root("System Root");
    let leaf = root.issue_expired(&key(), &["www.example.com"]);
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);
    assert_eq!(
        trust.verify(&[leaf], "www.example.com"),
        Err(RejectReason::Expired)
    );
}

// @tc.name: ut_system_trust_hostname_001
// @tc.desc: Test hostname matching rules
// @tc.precon: NA
// @tc.step: 1. Verify a wildcard leaf against one and two level subdomains
//           2. Verify an exact leaf against another host, with different case and trailing dot
//           3. Verify an IP address leaf
// @tc.expect: Only single label wildcards, exact names ignoring case and matching IPs pass
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_system_trust_hostname_001() {
    let root = TestCa::root("System Root");
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);

    let wildcard = root.issue(&key(), &["*.example.com"], 1);
    assert_eq!(trust.verify(&[wildcard.clone()], "api.example.com"), Ok(()));
    assert_eq!(
        trust.verify(&[wildcard.clone()], "a.b.example.com"),
        Err(RejectReason::HostnameMismatch)
    );
    assert_eq!(
        trust.verify(&[wildcard], "example.com"),
        Err(RejectReason::HostnameMismatch)
    );

    let exact = root.issue(&key(), &["www.example.com"], 2);
    assert_eq!(trust.verify(&[exact.clone()], "WWW.Example.com."), Ok(()));
    assert_eq!(
        trust.verify(&[exact], "mail.example.com"),
        Err(RejectReason::HostnameMismatch)
    );

    let ip = root.issue(&key(), &["127.0.0.1"], 3);
    assert_eq!(trust.verify(&[ip.clone()], "127.0.0.1"), Ok(()));
    assert_eq!(
        trust.verify(&[ip], "127.0.0.2"),
        Err(RejectReason::HostnameMismatch)
    );
}

// @tc.name: ut_system_trust_common_name_001
// @tc.desc: Test the common name is not used as a host name
// @tc.precon: NA
// @tc.step: 1. Verify a leaf without SAN whose common name is legacy.example.com
// @tc.expect: Verification fails with HostnameMismatch
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_system_trust_common_name_001() {
    let root = TestCa::root("System Root");
    let trust = WebPkiSystemTrust::new(vec![root.certificate()]);
    let leaf = root.issue_without_san(&key(), "legacy.example.com");
    assert_eq!(
        trust.verify(&[leaf], "legacy.example.com"),
        Err(RejectReason::HostnameMismatch)
    );
}

// @tc.name: ut_system_trust_malformed_001
// @tc.desc: Test empty and malformed chains
// @tc.precon: NA
// @tc.step: 1. Verify an empty chain
//           2. Verify a chain holding garbage
// @tc.expect: EmptyChain and Malformed
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_system_trust_malformed_001() {
    let trust = WebPkiSystemTrust::default();
    assert_eq!(trust.verify(&[], "a.example.com"), Err(RejectReason::EmptyChain));
    assert_eq!(
        trust.verify(&[vec![1, 2, 3]], "a.example.com"),
        Err(RejectReason::Malformed)
    );
}

// @tc.name: ut_system_trust_from_dir_001
// @tc.desc: Test loading anchors from a directory
// @tc.precon: NA
// @tc.step: 1. Write a root PEM into a temporary directory
//           2. Create the verifier from the directory and verify a leaf
// @tc.expect: One anchor loaded and verification succeeds
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_system_trust_from_dir_001() {
    let root = TestCa::root("Dir Root");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("root.pem"), root.pem()).unwrap();
    let trust = WebPkiSystemTrust::from_dir(dir.path()).unwrap();
    assert_eq!(trust.anchor_count(), 1);
    let leaf = root.issue(&key(), &["www.example.com"], 1);
    assert_eq!(trust.verify(&[leaf], "www.example.com"), Ok(()));
}
