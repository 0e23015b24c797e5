/// Business logic layer
///
/// Services sit between the HTTP handlers and `BlogRepository`:
/// - FeedService: paginated feeds for the index, groups, profiles and follows
/// - PostService: create, edit and post detail
/// - CommentService: replies on posts
/// - FollowService: subscriptions and profile summaries
pub mod comments;
pub mod feed;
pub mod follow;
pub mod posts;

pub use comments::CommentService;
pub use feed::{Feed, FeedService};
pub use follow::{FollowService, ProfileSummary};
pub use posts::{PostDetail, PostService};
