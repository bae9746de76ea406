use super::observation;
use super::{Context, Outcome};
use crate::cli::opts::{Format, LimitChoice};
use crate::cli::prompt;
use crate::cli::sink::Error as SinkError;
use crate::data::date_range::{DateRange, DateRangeParseError};
use crate::data::notice::Notice;
use crate::error::{EXIT_FAILURE, EXIT_QUERY_ERROR};
use crate::httpclient::data::{ApiError, ApiReply, Observation};
use crate::httpclient::Error as HttpError;
use snafu::{ResultExt, Snafu};
use std::io::{self, BufRead, Write};

/// More observations than this on the first page require a decision
/// of the user.
const MANY_OBSERVATIONS: usize = 10;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{}", source))]
    DateRange { source: DateRangeParseError },

    #[snafu(display(
        "There was an error in the query ({}). Make sure the ground station id exists and the dates are correct.",
        kind
    ))]
    Query { kind: ApiError },

    #[snafu(display("The api reported '{}' for page {}", kind, page))]
    PageQuery { kind: ApiError, page: u32 },

    #[snafu(display("Unexpected response from the api for page {}: {}", page, body))]
    Unexpected { page: u32, body: String },

    #[snafu(display("An http error occurred: {}", source))]
    HttpClient { source: HttpError },

    #[snafu(display("Error reading the answer: {}", source))]
    Prompt { source: io::Error },

    #[snafu(display("Error writing data: {}", source))]
    WriteResult { source: SinkError },

    #[snafu(display("{}", source))]
    Observation { source: observation::Error },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DateRange { .. }
            | Error::Query { .. }
            | Error::PageQuery { .. }
            | Error::Unexpected { .. } => EXIT_QUERY_ERROR,
            Error::HttpClient { .. }
            | Error::Prompt { .. }
            | Error::WriteResult { .. }
            | Error::Observation { .. } => EXIT_FAILURE,
        }
    }
}

/// Processes all observations of a station within the date range,
/// page by page, until the api reports that there are no more pages.
///
/// If the first page is large and no limit was given up front, the
/// user is asked via `input` whether to continue.
pub async fn exec<R: BufRead>(
    ctx: &Context,
    station_id: u32,
    date_range: &str,
    input: &mut R,
) -> Result<Outcome, Error> {
    let range = DateRange::parse(date_range).context(DateRangeSnafu)?;
    log::debug!("Querying station {} for {}", station_id, range);

    let mut page = 1;
    let mut observations = match fetch_page(ctx, station_id, &range, page).await? {
        ApiReply::Data(obs) => obs,
        ApiReply::Known(kind) => return QuerySnafu { kind }.fail(),
        ApiReply::Unrecognized(body) => {
            return UnexpectedSnafu {
                page,
                body: body.to_string(),
            }
            .fail()
        }
    };

    let choice = match ctx.limit {
        Some(choice) => choice,
        None if observations.len() > MANY_OBSERVATIONS => ask_limit(ctx, input)?,
        None => LimitChoice::Unlimited,
    };
    let limit = match choice {
        LimitChoice::Abort => return Ok(Outcome::Declined),
        LimitChoice::Unlimited => None,
        LimitChoice::Limit(n) => Some(n.get()),
    };

    let mut count = 0;
    loop {
        log::debug!("Page {} has {} observation(s)", page, observations.len());
        for obs in observations.iter() {
            observation::handle(ctx, obs)
                .await
                .context(ObservationSnafu)?;
            count += 1;
            if limit.is_some_and(|max| count >= max) {
                return Ok(Outcome::LimitReached {
                    observations: count,
                });
            }
        }

        page += 1;
        observations = match fetch_page(ctx, station_id, &range, page).await? {
            ApiReply::Data(obs) => obs,
            ApiReply::Known(ApiError::InvalidPage) | ApiReply::Known(ApiError::EmptyResult) => {
                return Ok(Outcome::Finished {
                    observations: count,
                    pages: page - 1,
                })
            }
            ApiReply::Known(kind) => return PageQuerySnafu { kind, page }.fail(),
            ApiReply::Unrecognized(body) => {
                return UnexpectedSnafu {
                    page,
                    body: body.to_string(),
                }
                .fail()
            }
        };
    }
}

async fn fetch_page(
    ctx: &Context,
    station_id: u32,
    range: &DateRange,
    page: u32,
) -> Result<ApiReply<Vec<Observation>>, Error> {
    ctx.client
        .fetch_by_date(station_id, range, page, ctx.debug)
        .await
        .context(HttpClientSnafu)
}

fn ask_limit<R: BufRead>(ctx: &Context, input: &mut R) -> Result<LimitChoice, Error> {
    ctx.notify(Notice::warning(format!(
        "There are over {} observations in this range and there may be many more than that.\n",
        MANY_OBSERVATIONS
    )))
    .context(WriteResultSnafu)?;
    if !ctx.no_download {
        ctx.notify(Notice::info(
            "Audio and image files will be downloaded for EACH observation.\n\n\
             **You can suppress file downloads with the --no-download flag**\n",
        ))
        .context(WriteResultSnafu)?;
    }

    let mut out: Box<dyn Write> = match ctx.format {
        Format::Json => Box::new(io::stderr()),
        Format::Default => Box::new(io::stdout()),
    };
    prompt::ask_limit(input, &mut out).context(PromptSnafu)
}
