//! Instruction templates sent to the completion provider.

use crate::draft::THREAD_LENGTH;

/// Line prefix every thread entry must carry in the completion.
pub const THREAD_PREFIX: &str = "Tweet:";

/// Prompt asking for one standalone post about `source`.
pub fn single_post_prompt(source: &str) -> String {
    format!(
        "Create a single engaging tweet based on this content:\n\n\
         {source}\n\n\
         Rules:\n\
         1. Must be under 280 characters\n\
         2. Make it engaging and conversational\n\
         3. Include 1-2 relevant hashtags\n\
         4. Focus on the most important point\n\
         5. End with either a hook or call to action\n\n\
         Return just the tweet text, no additional formatting."
    )
}

/// Prompt asking for a reply chain of exactly `THREAD_LENGTH` line-prefixed posts.
pub fn thread_prompt(source: &str) -> String {
    let n = THREAD_LENGTH;
    format!(
        "Create a Twitter thread with exactly {n} tweets based on this content:\n\n\
         {source}\n\n\
         Rules:\n\
         1. Each tweet must be under 280 characters\n\
         2. Make it engaging and conversational\n\
         3. Include relevant hashtags where appropriate\n\
         4. Break down complex ideas into digestible tweets\n\
         5. End with a call to action or thought-provoking question\n\
         6. Format each tweet on a new line, starting with \"{THREAD_PREFIX} \"\n\
         7. Must provide exactly {n} tweets\n\n\
         Example format:\n\
         {THREAD_PREFIX} First tweet content here\n\
         {THREAD_PREFIX} Second tweet content here\n\
         ...\n\
         {THREAD_PREFIX} Final tweet with call to action"
    )
}
