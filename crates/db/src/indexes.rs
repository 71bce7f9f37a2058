use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::RecordingStatus;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Meetings
    create_indexes(
        db,
        "meetings",
        vec![index_unique(bson::doc! { "room_name": 1 })],
    )
    .await?;

    // Participants
    create_indexes(
        db,
        "participants",
        vec![
            index_unique(bson::doc! { "meeting_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    // Recordings. The partial unique index is the at-most-one-active
    // invariant: a second insert (or transition back into an active status)
    // for the same meeting hits a duplicate-key error. Requires MongoDB >= 6
    // for $in in partialFilterExpression.
    let active: Vec<&str> = RecordingStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
    create_indexes(
        db,
        "recordings",
        vec![
            index(bson::doc! { "meeting_id": 1, "started_at": -1 }),
            index_unique_partial(
                bson::doc! { "meeting_id": 1 },
                bson::doc! { "status": { "$in": active } },
            ),
        ],
    )
    .await?;

    // Meeting Events
    create_indexes(
        db,
        "meeting_events",
        vec![index(bson::doc! { "meeting_id": 1, "created_at": -1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn index_unique_partial(keys: bson::Document, filter: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(filter)
                .build(),
        )
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
