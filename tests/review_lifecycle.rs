use courseware::actions;
use courseware::db::Database;
use courseware::models::review::ReviewForm;
use courseware::models::vote::VoteResult;
use uuid::Uuid;

async fn setup() -> Database {
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();
    db.insert_course(101, "Intro to CS").await.unwrap();
    db.insert_professor(Some("Jane"), "Smith").await.unwrap();
    db
}

fn review_form() -> ReviewForm {
    ReviewForm {
        course: "101 Intro to CS".into(),
        professor: "jane smith".into(),
        year: "2024".into(),
        term: "2".into(),
        title: "Would take again".into(),
        content: "Projects carry the grade; start them early.".into(),
        course_rating: "5".into(),
        course_difficulty_rating: "3".into(),
        course_workload: "10".into(),
        professor_rating: "5".into(),
        professor_difficulty_rating: "3".into(),
        lecture_rating: "4".into(),
    }
}

#[tokio::test]
async fn full_review_lifecycle() {
    let db = setup().await;
    let author = Uuid::new_v4().to_string();
    let course_watcher = Uuid::new_v4().to_string();
    let voter = Uuid::new_v4().to_string();

    db.create_subscription(&course_watcher, Some(101), None, None)
        .await
        .unwrap();

    // Create: the course watcher hears about it, the author follows it
    let review = actions::create_review(&db, &review_form(), &author)
        .await
        .unwrap();
    assert!(review.professor_id.is_some());

    let feed = db
        .find_notifications_by_recipient(&course_watcher)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    let item = &feed[0];
    assert_eq!(item.notification.course_code, Some(101));
    assert_eq!(item.notification.review_id, Some(review.id));
    // The feed join carries the display context along
    assert_eq!(item.course.as_ref().unwrap().name, "Intro to CS");
    assert_eq!(item.review.as_ref().unwrap().title, "Would take again");
    assert_eq!(item.professor.as_ref().unwrap().last_name, "SMITH");

    // Vote: the author is notified through their auto-subscription
    let result = actions::vote(&db, &voter, review.id, true).await.unwrap();
    let vote_id = match result {
        VoteResult::Cast(vote) => vote.id,
        other => panic!("expected a cast vote, got {:?}", other),
    };
    let feed = db.find_notifications_by_recipient(&author).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].notification.vote_id, Some(vote_id));
    assert_eq!(feed[0].vote.as_ref().unwrap().id, vote_id);

    // Retract: the vote notification disappears with the vote
    let result = actions::vote(&db, &voter, review.id, true).await.unwrap();
    assert!(matches!(result, VoteResult::Removed(_)));
    assert!(db
        .find_notifications_by_recipient(&author)
        .await
        .unwrap()
        .is_empty());

    // Edit: the rating and the timestamp move in one write
    let mut form = review_form();
    form.course_rating = "3".into();
    let updated = actions::update_review(&db, review.id, &form).await.unwrap();
    assert_eq!(updated.rating, 3);
    assert_ne!(updated.last_modified, review.last_modified);

    // Delete: subscriptions and notifications referencing the review go too
    actions::delete_review(&db, review.id).await.unwrap();
    assert!(db
        .find_subscriptions_by_user(&author)
        .await
        .unwrap()
        .is_empty());
    assert!(db
        .find_notifications_by_recipient(&course_watcher)
        .await
        .unwrap()
        .is_empty());
}
