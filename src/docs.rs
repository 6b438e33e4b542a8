use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use seitech_core::pagination::{OffsetPagination, PageMeta, PaginationParams};
use seitech_core::permissions::Role;
use seitech_core::response::{Envelope, ErrorEnvelope};

use crate::modules::admin::model::{
    AdminCourse, AdminUser, CourseInstructor, CreateCourseRequest, CreateInstructorRequest,
    CreateUserRequest,
};
use crate::modules::auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, SessionStatus, SessionUser,
};
use crate::modules::blog::model::{BlogAuthor, BlogCategory, BlogList, BlogPagination, BlogPost};
use crate::modules::cart::model::{
    AddToCartRequest, Cart, CartItem, CartUpdate, SyncCartItem, SyncCartRequest,
};
use crate::modules::certificates::model::{VerifiedCertificate, VerifyCertificateRequest};
use crate::modules::courses::model::{CourseSearchResponse, CourseSummary};
use crate::modules::dashboard::model::{
    DashboardCertificate, DashboardData, DashboardEnrollment, EnrollmentState, UserStats,
};
use crate::modules::discussions::model::{
    CreateDiscussionRequest, CreateReplyRequest, DiscussionAction, DiscussionPage,
    UpdateDiscussionRequest, UpvoteResult,
};
use crate::modules::enquiries::model::{
    ConsultationRequest, ContactRequest, PreferredContact, SubmissionReceipt,
};
use crate::modules::enrollments::model::CreateEnrollmentRequest;
use crate::modules::gamification::model::{
    AchievementStats, Badge, BadgeList, LeaderboardEntry, LeaderboardPage, StreakActionRequest,
    StudentLeaderboard, StudentRanking, UserAchievements,
};
use crate::modules::health::model::{HealthReport, HealthServices, OdooHealth};
use crate::modules::learning_paths::model::{
    ActionParams, CreateLearningPathRequest, PathActionRequest, PathActionResult,
    UpdateLearningPathRequest,
};
use crate::modules::notifications::model::{
    CreateNotificationRequest, Notification, NotificationPage, ReadAllResult,
};
use crate::modules::orders::model::{CreateOrderRequest, OrderCustomer, OrderItem};
use crate::modules::recommendations::model::{
    GenerateRequest, RecommendationAction, UpdateRecommendationRequest,
};
use crate::modules::schedules::model::{
    Attendee, RegistrationRequest, RegistrationResult, ScheduleCourse, ScheduleDetail,
    ScheduleInstructor, ScheduleList, ScheduleListItem,
};
use crate::modules::skills::model::UserSkillActionRequest;
use crate::modules::study_groups::model::{
    CreateStudyGroupRequest, GroupState, Membership, MembershipChange, StudyGroupPage,
    UpdateStudyGroupRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::get_course_by_slug,
        crate::modules::courses::controller::search_courses,
        crate::modules::courses::controller::get_categories,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::session,
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::forgot_password,
        crate::modules::cart::controller::get_cart,
        crate::modules::cart::controller::add_to_cart,
        crate::modules::cart::controller::sync_cart,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::certificates::controller::get_certificates,
        crate::modules::certificates::controller::verify_certificate,
        crate::modules::dashboard::controller::get_stats,
        crate::modules::cms::controller::get_settings,
        crate::modules::cms::controller::get_navigation,
        crate::modules::cms::controller::get_testimonials,
        crate::modules::cms::controller::get_faqs,
        crate::modules::cms::controller::get_faq_categories,
        crate::modules::cms::controller::get_services,
        crate::modules::cms::controller::get_service_categories,
        crate::modules::cms::controller::get_service,
        crate::modules::cms::controller::get_partners,
        crate::modules::cms::controller::get_team,
        crate::modules::cms::controller::get_statistics,
        crate::modules::cms::controller::get_homepage,
        crate::modules::cms::controller::get_pages,
        crate::modules::cms::controller::get_page,
        crate::modules::cms::controller::get_section,
        crate::modules::notifications::controller::get_notifications,
        crate::modules::notifications::controller::create_notification,
        crate::modules::notifications::controller::get_notification,
        crate::modules::notifications::controller::delete_notification,
        crate::modules::notifications::controller::mark_notification_read,
        crate::modules::notifications::controller::mark_all_read,
        crate::modules::gamification::controller::get_leaderboard,
        crate::modules::gamification::controller::update_leaderboard,
        crate::modules::gamification::controller::get_student_leaderboard,
        crate::modules::gamification::controller::get_badges,
        crate::modules::gamification::controller::get_user_achievements,
        crate::modules::gamification::controller::get_my_streak,
        crate::modules::gamification::controller::update_my_streak,
        crate::modules::discussions::controller::get_discussions,
        crate::modules::discussions::controller::create_discussion,
        crate::modules::discussions::controller::get_discussion,
        crate::modules::discussions::controller::update_discussion,
        crate::modules::discussions::controller::delete_discussion,
        crate::modules::discussions::controller::get_replies,
        crate::modules::discussions::controller::create_reply,
        crate::modules::discussions::controller::upvote_discussion,
        crate::modules::study_groups::controller::get_study_groups,
        crate::modules::study_groups::controller::create_study_group,
        crate::modules::study_groups::controller::get_study_group,
        crate::modules::study_groups::controller::update_study_group,
        crate::modules::study_groups::controller::delete_study_group,
        crate::modules::study_groups::controller::join_study_group,
        crate::modules::study_groups::controller::leave_study_group,
        crate::modules::schedules::controller::get_schedules,
        crate::modules::schedules::controller::get_schedule,
        crate::modules::schedules::controller::register_for_schedule,
        crate::modules::learning_paths::controller::get_learning_paths,
        crate::modules::learning_paths::controller::create_learning_path,
        crate::modules::learning_paths::controller::get_learning_path,
        crate::modules::learning_paths::controller::update_learning_path,
        crate::modules::learning_paths::controller::delete_learning_path,
        crate::modules::learning_paths::controller::run_learning_path_action,
        crate::modules::skills::controller::get_skills,
        crate::modules::skills::controller::get_skill,
        crate::modules::skills::controller::get_user_skills,
        crate::modules::skills::controller::update_user_skill,
        crate::modules::recommendations::controller::get_recommendations,
        crate::modules::recommendations::controller::generate_recommendations,
        crate::modules::recommendations::controller::update_recommendation,
        crate::modules::orders::controller::create_order,
        crate::modules::orders::controller::get_orders,
        crate::modules::enquiries::controller::submit_contact,
        crate::modules::enquiries::controller::request_consultation,
        crate::modules::blog::controller::get_posts,
        crate::modules::blog::controller::get_post,
        crate::modules::seo::controller::get_sitemap,
        crate::modules::seo::controller::get_robots,
        crate::modules::admin::controller::list_users,
        crate::modules::admin::controller::create_user,
        crate::modules::admin::controller::get_user,
        crate::modules::admin::controller::update_user,
        crate::modules::admin::controller::delete_user,
        crate::modules::admin::controller::list_courses,
        crate::modules::admin::controller::create_course,
        crate::modules::admin::controller::get_course,
        crate::modules::admin::controller::update_course,
        crate::modules::admin::controller::delete_course,
        crate::modules::admin::controller::list_instructors,
        crate::modules::admin::controller::create_instructor,
        crate::modules::admin::controller::get_instructor,
        crate::modules::admin::controller::update_instructor,
        crate::modules::admin::controller::delete_instructor,
        crate::modules::admin::controller::get_analytics_overview,
    ),
    components(
        schemas(
            Envelope,
            ErrorEnvelope,
            PageMeta,
            OffsetPagination,
            PaginationParams,
            Role,
            HealthReport,
            HealthServices,
            OdooHealth,
            CourseSummary,
            CourseSearchResponse,
            LoginRequest,
            RegisterRequest,
            ForgotPasswordRequest,
            SessionUser,
            LoginResponse,
            SessionStatus,
            AddToCartRequest,
            SyncCartRequest,
            SyncCartItem,
            CartItem,
            Cart,
            CartUpdate,
            CreateEnrollmentRequest,
            VerifyCertificateRequest,
            VerifiedCertificate,
            UserStats,
            EnrollmentState,
            DashboardEnrollment,
            DashboardCertificate,
            DashboardData,
            CreateNotificationRequest,
            Notification,
            NotificationPage,
            ReadAllResult,
            LeaderboardEntry,
            LeaderboardPage,
            StudentRanking,
            StudentLeaderboard,
            Badge,
            BadgeList,
            AchievementStats,
            UserAchievements,
            StreakActionRequest,
            CreateDiscussionRequest,
            DiscussionAction,
            UpdateDiscussionRequest,
            CreateReplyRequest,
            UpvoteResult,
            DiscussionPage,
            CreateStudyGroupRequest,
            GroupState,
            UpdateStudyGroupRequest,
            Membership,
            StudyGroupPage,
            MembershipChange,
            ScheduleListItem,
            ScheduleList,
            ScheduleCourse,
            ScheduleInstructor,
            ScheduleDetail,
            RegistrationRequest,
            Attendee,
            RegistrationResult,
            CreateLearningPathRequest,
            UpdateLearningPathRequest,
            ActionParams,
            PathActionRequest,
            PathActionResult,
            UserSkillActionRequest,
            GenerateRequest,
            RecommendationAction,
            UpdateRecommendationRequest,
            OrderCustomer,
            OrderItem,
            CreateOrderRequest,
            ContactRequest,
            PreferredContact,
            ConsultationRequest,
            SubmissionReceipt,
            BlogAuthor,
            BlogPost,
            BlogCategory,
            BlogPagination,
            BlogList,
            CreateUserRequest,
            CreateCourseRequest,
            CreateInstructorRequest,
            AdminUser,
            CourseInstructor,
            AdminCourse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Gateway and ERP reachability"),
        (name = "Courses", description = "Public course catalogue"),
        (name = "Authentication", description = "Login, registration and session cookies"),
        (name = "Cart", description = "Shopping cart backed by a draft sale order"),
        (name = "Enrollments", description = "Course enrollments of the current user"),
        (name = "Certificates", description = "Issued certificates and public verification"),
        (name = "Dashboard", description = "Learner dashboard aggregates"),
        (name = "CMS", description = "Site content managed in the ERP"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Gamification", description = "Leaderboards, badges, achievements and streaks"),
        (name = "Discussions", description = "Course discussion threads"),
        (name = "Study Groups", description = "Learner study groups"),
        (name = "Schedules", description = "Scheduled course sessions and registrations"),
        (name = "Learning Paths", description = "Curated sequences of courses"),
        (name = "Skills", description = "Skill catalogue and user skill progress"),
        (name = "Recommendations", description = "Personalised course recommendations"),
        (name = "Orders", description = "Checkout orders"),
        (name = "Enquiries", description = "Contact and consultation forms"),
        (name = "Blog", description = "Blog posts and categories"),
        (name = "SEO", description = "Sitemap and robots.txt"),
        (name = "Admin", description = "Back-office management of users, courses and instructors")
    ),
    info(
        title = "SEI Tech API",
        version = "0.1.0",
        description = "Backend-for-frontend for the SEI Tech health and safety training site, proxying the Odoo ERP.",
        contact(
            name = "SEI Tech Support",
            email = "info@seitechinternational.org.uk"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session_token"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_registers_security_schemes() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("cookie_auth"));
    }

    #[test]
    fn test_openapi_lists_public_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/health"));
        assert!(doc.paths.paths.contains_key("/api/sitemap"));
        assert!(doc.paths.paths.contains_key("/api/admin/users/{id}"));
    }
}
