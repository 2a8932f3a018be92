extern crate rstest;
extern crate serde_json;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::App;
use campus_repo::course_repo::CourseRepo;
use rstest::rstest;
use serde_json::json;
use tracing::instrument;

use utils::course_repo;
use utils::tracing_setup;

#[macro_use]
mod utils;

#[instrument(skip(course_repo))]
#[rstest]
#[actix_rt::test]
async fn test_create_assignment(_tracing_setup: &(), course_repo: Arc<dyn CourseRepo>) {
    let service = test::init_service(build_course_app!(course_repo)).await;
    let (_, course) = post_json!(
        &service,
        "/api/courses/",
        json!({ "code": "CS 1998", "name": "Intro to Backend Development" })
    );

    let uri = format!("/api/courses/{}/assignment/", course["id"]);
    let (status, assignment) = post_json!(
        &service,
        &uri,
        json!({ "title": "PA4", "due_date": 1553354209 })
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["title"], "PA4");
    assert_eq!(assignment["due_date"], 1553354209);
    assert_eq!(
        assignment["course"],
        json!({
            "id": course["id"],
            "code": "CS 1998",
            "name": "Intro to Backend Development",
        })
    );

    let uri = format!("/api/assignments/{}/", assignment["id"]);
    let (status, stored_assignment) = get_json!(&service, &uri);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_assignment, assignment);

    let uri = format!("/api/courses/{}/", course["id"]);
    let (_, course) = get_json!(&service, &uri);
    assert_eq!(
        course["assignments"],
        json!([{ "id": assignment["id"], "title": "PA4", "due_date": 1553354209 }])
    );
}

#[instrument(skip(course_repo))]
#[rstest]
#[case::missing_title(json!({ "due_date": 1553354209 }))]
#[case::missing_due_date(json!({ "title": "PA4" }))]
#[actix_rt::test]
async fn test_create_assignment_missing_fields(
    _tracing_setup: &(),
    course_repo: Arc<dyn CourseRepo>,
    #[case] body: serde_json::Value,
) {
    let service = test::init_service(build_course_app!(course_repo)).await;
    let (_, course) = post_json!(
        &service,
        "/api/courses/",
        json!({ "code": "CS 1998", "name": "Intro to Backend Development" })
    );

    let uri = format!("/api/courses/{}/assignment/", course["id"]);
    let (status, error) = post_json!(&service, &uri, body);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error, json!({ "error": "didn't provide info" }));
}

#[instrument(skip(course_repo))]
#[rstest]
#[actix_rt::test]
async fn test_create_assignment_for_missing_course(
    _tracing_setup: &(),
    course_repo: Arc<dyn CourseRepo>,
) {
    let service = test::init_service(build_course_app!(course_repo)).await;

    let (status, error) = post_json!(
        &service,
        "/api/courses/1234/assignment/",
        json!({ "title": "PA4", "due_date": 1553354209 })
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error, json!({ "error": "course not found" }));

    // the missing course wins over the missing fields
    let (status, _) = post_json!(&service, "/api/courses/1234/assignment/", json!({}));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[instrument(skip(course_repo))]
#[rstest]
#[actix_rt::test]
async fn test_delete_course_removes_assignments(
    _tracing_setup: &(),
    course_repo: Arc<dyn CourseRepo>,
) {
    let service = test::init_service(build_course_app!(course_repo)).await;
    let (_, course) = post_json!(
        &service,
        "/api/courses/",
        json!({ "code": "CS 1998", "name": "Intro to Backend Development" })
    );
    let (_, user) = post_json!(
        &service,
        "/api/users/",
        json!({ "name": "Alicia Wang", "netid": "aw123" })
    );
    let uri = format!("/api/courses/{}/assignment/", course["id"]);
    let (_, assignment) = post_json!(
        &service,
        &uri,
        json!({ "title": "PA4", "due_date": 1553354209 })
    );
    let uri = format!("/api/courses/{}/add/", course["id"]);
    let (status, _) = post_json!(
        &service,
        &uri,
        json!({ "user_id": user["id"], "type": "student" })
    );
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/courses/{}/", course["id"]);
    let (status, deleted_course) = delete_json!(&service, &uri);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted_course["assignments"].as_array().unwrap().len(), 1);

    let uri = format!("/api/assignments/{}/", assignment["id"]);
    let (status, error) = get_json!(&service, &uri);
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error, json!({ "error": "assignment not found" }));

    let uri = format!("/api/users/{}/", user["id"]);
    let (status, stored_user) = get_json!(&service, &uri);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_user["netid"], "aw123");
    assert_eq!(stored_user["courses"], json!([]));
}
