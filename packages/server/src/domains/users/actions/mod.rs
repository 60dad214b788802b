mod accounts;

pub use accounts::{
    current_user, delete_user, find_username, get_user, is_email_available,
    is_user_id_available, require_user, sign_in, sign_up, update_password,
    update_profile_image, update_user, SignInResult, SignUpInput, UserProfile,
};
