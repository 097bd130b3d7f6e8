//! User and profile storage.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, params};

use crate::model::{AuthMethod, Profile, ProfileUpdate, User};

use super::{Result, StorageError, conflict_or, parse_timestamp, timestamp_to_sql};

/// Inserts a user together with an all-empty profile row.
pub(super) fn create_user(conn: &mut Connection, id: &str, auth_method: AuthMethod) -> Result<User> {
    let user = User {
        id: id.to_string(),
        auth_method,
        created_at: Timestamp::now(),
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO users (id, auth_method, created_at) VALUES (?1, ?2, ?3)",
        params![&user.id, user.auth_method.as_str(), timestamp_to_sql(user.created_at)],
    )
    .map_err(|e| conflict_or(e, || format!("user {id} already exists")))?;
    tx.execute(
        "INSERT INTO profiles (user_id, updated_at) VALUES (?1, ?2)",
        params![&user.id, timestamp_to_sql(user.created_at)],
    )?;
    tx.commit()?;

    Ok(user)
}

pub(super) fn load_user(conn: &Connection, id: &str) -> Result<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, auth_method, created_at FROM users WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, auth_method, created_at)) = row else {
        return Ok(None);
    };
    Ok(Some(User {
        id,
        auth_method: auth_method.parse::<AuthMethod>().map_err(StorageError::Corrupt)?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    }))
}

pub(super) fn load_profile(conn: &Connection, owner: &str) -> Result<Option<Profile>> {
    let row = conn
        .query_row(
            "SELECT nickname, age, gender, postal_code, address, interests
             FROM profiles WHERE user_id = ?1",
            [owner],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((nickname, age, gender, postal_code, address, interests)) = row else {
        return Ok(None);
    };
    let age = age
        .map(|a| u8::try_from(a).map_err(|_| StorageError::Corrupt(format!("invalid age: {a}"))))
        .transpose()?;

    Ok(Some(Profile {
        nickname,
        age,
        gender,
        postal_code,
        address,
        interests: serde_json::from_str(&interests)?,
    }))
}

/// Applies `update` on top of the stored profile and writes the row back in one transaction.
pub(super) fn update_profile(conn: &mut Connection, owner: &str, update: &ProfileUpdate) -> Result<()> {
    let tx = conn.transaction()?;
    let Some(mut profile) = load_profile(&tx, owner)? else {
        return Err(StorageError::UserNotFound(owner.to_string()));
    };
    profile.apply(update);

    tx.execute(
        "UPDATE profiles
         SET nickname = ?1, age = ?2, gender = ?3, postal_code = ?4, address = ?5,
             interests = ?6, updated_at = ?7
         WHERE user_id = ?8",
        params![
            &profile.nickname,
            profile.age,
            &profile.gender,
            &profile.postal_code,
            &profile.address,
            serde_json::to_string(&profile.interests)?,
            timestamp_to_sql(Timestamp::now()),
            owner,
        ],
    )?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::WishStore;
    use crate::storage::testing::*;

    use super::*;

    #[test]
    fn create_user_starts_with_empty_profile() {
        let (_dir, storage) = test_storage();

        let user = storage.load_user("bob").unwrap().unwrap();
        assert_eq!(user.auth_method, AuthMethod::Google);
        assert_eq!(storage.load_profile("bob").unwrap(), Some(Profile::default()));
    }

    #[test]
    fn create_duplicate_user_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.create_user("alice", AuthMethod::Google).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn unknown_user_and_profile_are_none() {
        let (_dir, storage) = test_storage();
        assert!(storage.load_user("carol").unwrap().is_none());
        assert!(storage.load_profile("carol").unwrap().is_none());
    }

    #[test]
    fn update_profile_writes_only_given_fields() {
        let (_dir, storage) = test_storage();
        storage
            .update_profile(
                "alice",
                &ProfileUpdate {
                    nickname: Some(Some("alice".into())),
                    address: Some(Some("Shibuya, Tokyo".into())),
                    interests: Some(vec!["hiking".into(), "jazz".into()]),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        storage
            .update_profile(
                "alice",
                &ProfileUpdate {
                    age: Some(Some(30)),
                    address: Some(None),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();

        let profile = storage.load_profile("alice").unwrap().unwrap();
        assert_eq!(profile.nickname.as_deref(), Some("alice"));
        assert_eq!(profile.age, Some(30));
        assert!(profile.address.is_none());
        assert_eq!(profile.interests, ["hiking", "jazz"]);
    }

    #[test]
    fn update_profile_of_unknown_user_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .update_profile("carol", &ProfileUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StorageError::UserNotFound(_)));
    }
}
