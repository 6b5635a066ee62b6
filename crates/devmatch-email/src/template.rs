// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text email bodies.

use devmatch_core::TrialEndingNotice;

/// Subject and body of a trial-ending reminder.
pub fn trial_ending(notice: &TrialEndingNotice) -> (String, String) {
    let subject = format!("Your Devmatch free trial ends in {}", notice.time_left);
    let body = format!(
        "Hi {username},\n\
         \n\
         Your Devmatch free trial ends on {trial_end}, {time_left} from now.\n\
         Upgrade before then to keep your matches, projects and chats.\n\
         \n\
         The Devmatch team\n",
        username = notice.username,
        trial_end = notice.trial_end,
        time_left = notice.time_left,
    );
    (subject, body)
}
