// Kept in step with `db::CREATE_BLOG_POSTS` by hand.

diesel::table! {
    blog_posts (id) {
        id -> Int4,
        #[max_length = 255]
        author_name -> Varchar,
        #[max_length = 255]
        author_email -> Varchar,
        #[max_length = 500]
        title -> Varchar,
        content -> Text,
        created_at -> Nullable<Timestamptz>,
    }
}
