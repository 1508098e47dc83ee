use super::test_helpers::*;
use super::*;
use crate::error::Error;
use crate::types::{SubmitOptions, SubmitOutcome, TaskId, TaskPhase};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
