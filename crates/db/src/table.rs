use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum SubmissionKey {
    Table,
    Kind,
    Subject,
    Target,
    CreatedAt,
}
