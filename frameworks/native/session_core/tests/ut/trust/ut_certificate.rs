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

// @tc.name: ut_certificate_from_der_001
// @tc.desc: Test parsing a DER certificate
// @tc.precon: NA
// @tc.step: 1. Parse a generated certificate
//           2. Parse garbage and a certificate with trailing bytes
// @tc.expect: Valid DER is accepted with a public key, the others fail with a config error
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 0
#[test]
fn ut_certificate_from_der_001() {
    let root = TestCa::root("Cert Root");
    let cert = Certificate::from_der(root.der()).unwrap();
    assert_eq!(cert.der(), root.der().as_slice());
    assert!(!cert.public_key().spki().is_empty());
    assert_eq!(cert.fingerprint().len(), 64);

    assert!(matches!(
        Certificate::from_der(vec![0x30, 0x03, 0x01]),
        Err(SessionError::Config(_))
    ));
    let mut trailing = root.der();
    trailing.push(0);
    assert!(Certificate::from_der(trailing).is_err());
}

// @tc.name: ut_certificate_public_key_001
// @tc.desc: Test certificates sharing a key pair share the public key
// @tc.precon: NA
// @tc.step: 1. Issue two certificates with the same key and one with another key
// @tc.expect: Same key gives equal public keys and fingerprints, another key differs
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_certificate_public_key_001() {
    let root = TestCa::root("Cert Root");
    let shared = key();
    let first = Certificate::from_der(root.issue(&shared, &["a.example.com"], 1)).unwrap();
    let rotated = Certificate::from_der(root.issue(&shared, &["a.example.com"], 2)).unwrap();
    let other = Certificate::from_der(root.issue(&key(), &["a.example.com"], 3)).unwrap();

    assert_ne!(first, rotated);
    assert_eq!(first.public_key(), rotated.public_key());
    assert_eq!(first.public_key().fingerprint(), rotated.public_key().fingerprint());
    assert_ne!(first.public_key(), other.public_key());
}

// @tc.name: ut_certificate_from_pem_001
// @tc.desc: Test parsing a PEM bundle
// @tc.precon: NA
// @tc.step: 1. Concatenate two PEM certificates and parse them
//           2. Parse text without any certificate
// @tc.expect: Both certificates are returned in order, text without certificate fails
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_certificate_from_pem_001() {
    let first = TestCa::root("First");
    let second = TestCa::root("Second");
    let bundle = format!("{}\n{}", first.pem(), second.pem());
    let certs = Certificate::from_pem(bundle.as_bytes()).unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0].der(), first.der().as_slice());
    assert_eq!(certs[1].der(), second.der().as_slice());

    assert!(Certificate::from_pem(b"no certificates here").is_err());
}

// @tc.name: ut_certificate_load_dir_001
// @tc.desc: Test loading every certificate file of a directory
// @tc.precon: NA
// @tc.step: 1. Write a .cer DER file, a .pem file and an unrelated .txt file
//           2. Load the directory
// @tc.expect: Two certificates in name order, the text file is skipped
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 1
#[test]
fn ut_certificate_load_dir_001() {
    let first = TestCa::root("A Root");
    let second = TestCa::root("B Root");
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.cer"), first.der()).unwrap();
    fs::write(dir.path().join("b.PEM"), second.pem()).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a certificate").unwrap();

    let certs = Certificate::load_dir(dir.path()).unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0].der(), first.der().as_slice());
    assert_eq!(certs[1].der(), second.der().as_slice());
}

// @tc.name: ut_certificate_load_dir_002
// @tc.desc: Test loading a directory with a corrupt certificate file
// @tc.precon: NA
// @tc.step: 1. Write a .crt file holding garbage
//           2. Load the directory
// @tc.expect: A config error naming the file
// @tc.type: FUNC
// @tc.require: issueNumber
// @tc.level: Level 2
#[test]
fn ut_certificate_load_dir_002() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.crt"), b"garbage").unwrap();
    match Certificate::load_dir(dir.path()) {
        Err(SessionError::Config(msg)) => assert!(msg.contains("broken.crt")),
        other => panic!("unexpected result {:?}", other),
    }
}
