use std::fmt;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{
    de::{self, IgnoredAny, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

use crate::{error::ApiError, schema::blog_posts};

/// A stored blog post. `id` and `created_at` are assigned by the database.
///
/// `created_at` is nullable because tables created before this service
/// declared the column without `NOT NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = blog_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A post that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = blog_posts)]
pub struct NewPost {
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub content: String,
}

/// Body of `POST /posts` as sent by the client.
///
/// Only a JSON object is accepted; unknown keys are ignored.
#[derive(Debug, Default)]
pub struct CreatePostRequest {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl<'de> Deserialize<'de> for CreatePostRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CreatePostRequestVisitor)
    }
}

struct CreatePostRequestVisitor;

impl<'de> Visitor<'de> for CreatePostRequestVisitor {
    type Value = CreatePostRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object with author_name, author_email, title and content")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut request = CreatePostRequest::default();
        while let Some(key) = map.next_key::<String>()? {
            let (field, slot) = match key.as_str() {
                "author_name" => ("author_name", &mut request.author_name),
                "author_email" => ("author_email", &mut request.author_email),
                "title" => ("title", &mut request.title),
                "content" => ("content", &mut request.content),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            if slot.is_some() {
                return Err(de::Error::duplicate_field(field));
            }
            *slot = map.next_value()?;
        }
        Ok(request)
    }
}

impl CreatePostRequest {
    /// Absent, `null` and empty fields are all reported as missing, in
    /// declaration order.
    pub fn validate(self) -> Result<NewPost, ApiError> {
        let mut missing = Vec::new();
        let author_name = required("author_name", self.author_name, &mut missing);
        let author_email = required("author_email", self.author_email, &mut missing);
        let title = required("title", self.title, &mut missing);
        let content = required("content", self.content, &mut missing);

        match (author_name, author_email, title, content) {
            (Some(author_name), Some(author_email), Some(title), Some(content)) => Ok(NewPost {
                author_name,
                author_email,
                title,
                content,
            }),
            _ => Err(ApiError::MissingFields(missing)),
        }
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// Response body for a successful `POST /posts`.
#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub message: &'static str,
    #[serde(flatten)]
    pub post: Post,
}

impl From<Post> for CreatedPost {
    fn from(post: Post) -> Self {
        Self {
            message: "Blog post published successfully!",
            post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreatePostRequest {
        CreatePostRequest {
            author_name: Some("Ada".into()),
            author_email: Some("ada@x.com".into()),
            title: Some("Hi".into()),
            content: Some("Hello".into()),
        }
    }

    #[test]
    fn complete_request_validates() {
        let post = full_request().validate().unwrap();
        assert_eq!(
            post,
            NewPost {
                author_name: "Ada".into(),
                author_email: "ada@x.com".into(),
                title: "Hi".into(),
                content: "Hello".into(),
            }
        );
    }

    #[test]
    fn reports_every_missing_field_in_order() {
        let request = CreatePostRequest {
            author_name: Some("Ada".into()),
            ..Default::default()
        };
        match request.validate() {
            Err(ApiError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["author_email", "title", "content"])
            }
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let request = CreatePostRequest {
            title: Some(String::new()),
            ..full_request()
        };
        match request.validate() {
            Err(ApiError::MissingFields(fields)) => assert_eq!(fields, vec!["title"]),
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn null_fields_deserialize_as_missing() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"author_name":"Ada","content":null}"#).unwrap();
        assert_eq!(request.author_name.as_deref(), Some("Ada"));
        assert!(request.content.is_none());
    }

    #[test]
    fn only_json_objects_deserialize() {
        let err = serde_json::from_str::<CreatePostRequest>(r#"["Ada","ada@x.com","Hi","Hello"]"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid type: sequence"));

        assert!(serde_json::from_str::<CreatePostRequest>(r#""Ada""#).is_err());
        assert!(serde_json::from_str::<CreatePostRequest>("null").is_err());
    }

    #[test]
    fn unknown_keys_are_ignored_and_duplicates_rejected() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"title":"Hi","tags":["a",{"b":1}]}"#).unwrap();
        assert_eq!(request.title.as_deref(), Some("Hi"));

        let err = serde_json::from_str::<CreatePostRequest>(r#"{"title":"Hi","title":"Again"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field `title`"));
    }

    #[test]
    fn non_string_field_is_rejected() {
        assert!(serde_json::from_str::<CreatePostRequest>(r#"{"author_name":42}"#).is_err());
    }

    #[test]
    fn legacy_row_without_timestamp_serializes_null() {
        let post = Post {
            id: 1,
            author_name: "Ada".into(),
            author_email: "ada@x.com".into(),
            title: "Hi".into(),
            content: "Hello".into(),
            created_at: None,
        };
        let body = serde_json::to_value(post).unwrap();
        assert!(body["created_at"].is_null());
    }

    #[test]
    fn created_post_flattens_fields_next_to_message() {
        let post = Post {
            id: 7,
            author_name: "Ada".into(),
            author_email: "ada@x.com".into(),
            title: "Hi".into(),
            content: "Hello".into(),
            created_at: Some("2024-05-01T12:00:00Z".parse().unwrap()),
        };
        let body = serde_json::to_value(CreatedPost::from(post)).unwrap();
        assert_eq!(body["message"], "Blog post published successfully!");
        assert_eq!(body["id"], 7);
        assert_eq!(body["title"], "Hi");
        assert_eq!(body["created_at"], "2024-05-01T12:00:00Z");
    }
}
