use connector_database::basic_db::SafeDatabase;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::parser::post::{Comment, Like, Post};
use crate::parser::user::User;
use crate::store::DocumentStore;
use crate::validation::Validator;

const POST_NOT_FOUND: &str = "Post not found";

/// Posts plus their likes and comments.
#[derive(Clone)]
pub struct PostEditor<D> {
    store: DocumentStore<D>,
}

impl<D: SafeDatabase> PostEditor<D> {
    pub fn new(database: D) -> Self {
        Self {
            store: DocumentStore::new(database),
        }
    }

    fn author(&self, user: Uuid) -> Result<User, ServiceError> {
        self.store
            .find(&user.to_string())?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    /// Path ids that are not UUIDs are treated as missing posts.
    fn post(&self, post_id: &str) -> Result<Post, ServiceError> {
        let id = Uuid::parse_str(post_id).map_err(|_| ServiceError::not_found(POST_NOT_FOUND))?;
        self.store
            .find(&id.to_string())?
            .ok_or_else(|| ServiceError::not_found(POST_NOT_FOUND))
    }

    fn required_text(text: Option<String>) -> Result<String, ServiceError> {
        let mut check = Validator::default();
        check
            .required("text", text, "Text is required")
            .ok_or_else(|| check.into_error())
    }

    pub fn create(&self, user: Uuid, text: Option<String>) -> Result<Post, ServiceError> {
        let text = Self::required_text(text)?;
        let author = self.author(user)?;

        let post = Post::new(&author, text);
        self.store.save(&post)?;
        info!(post = %post.id, %user, "post created");
        Ok(post)
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<Post>, ServiceError> {
        let mut posts = self.store.all::<Post>()?;
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    pub fn get(&self, post_id: &str) -> Result<Post, ServiceError> {
        self.post(post_id)
    }

    /// Only the author may delete. A post that does not exist has no author,
    /// so that is refused the same way.
    pub fn delete(&self, post_id: &str, requester: Uuid) -> Result<(), ServiceError> {
        let id = Uuid::parse_str(post_id).map_err(|_| ServiceError::not_found(POST_NOT_FOUND))?;
        let key = id.to_string();

        match self.store.find::<Post>(&key)? {
            Some(post) if post.user == requester => {}
            _ => {
                warn!(post = %id, %requester, "post delete not authorized");
                return Err(ServiceError::forbidden("User not authorized"));
            }
        }

        if !self.store.remove::<Post>(&key)? {
            return Err(ServiceError::NothingToDelete("No post to delete".to_string()));
        }

        info!(post = %id, "post deleted");
        Ok(())
    }

    pub fn like(&self, post_id: &str, user: Uuid) -> Result<Vec<Like>, ServiceError> {
        let mut post = self.post(post_id)?;
        if post.is_liked_by(user) {
            return Err(ServiceError::AlreadyLiked);
        }

        post.likes.insert(0, Like { user });
        self.store.save(&post)?;
        Ok(post.likes)
    }

    pub fn unlike(&self, post_id: &str, user: Uuid) -> Result<Vec<Like>, ServiceError> {
        let mut post = self.post(post_id)?;
        let position = post
            .likes
            .iter()
            .position(|like| like.user == user)
            .ok_or(ServiceError::NotLiked)?;

        post.likes.remove(position);
        self.store.save(&post)?;
        Ok(post.likes)
    }

    pub fn add_comment(&self, post_id: &str, user: Uuid, text: Option<String>) -> Result<Vec<Comment>, ServiceError> {
        let text = Self::required_text(text)?;
        let mut post = self.post(post_id)?;
        let author = self.author(user)?;

        post.comments.insert(0, Comment::new(&author, text));
        self.store.save(&post)?;
        Ok(post.comments)
    }

    pub fn remove_comment(&self, post_id: &str, comment_id: &str, requester: Uuid) -> Result<Vec<Comment>, ServiceError> {
        let mut post = self.post(post_id)?;
        let position = Uuid::parse_str(comment_id)
            .ok()
            .and_then(|id| post.comments.iter().position(|comment| comment.id == id))
            .ok_or_else(|| ServiceError::not_found("Comment not found"))?;

        if post.comments[position].user != requester {
            warn!(post = %post.id, %requester, "comment delete not authorized");
            return Err(ServiceError::forbidden("User not authorized"));
        }

        post.comments.remove(position);
        self.store.save(&post)?;
        Ok(post.comments)
    }
}
