//! Report fixtures for E2E tests.

/// Well-formed report using the content analysis table layout (score 6.4).
#[allow(dead_code)]
pub const SPAM_REPORT: &str = "\
Spam detection software, running on the system \"mx.test\",
has identified this incoming email as possible spam.

Content analysis details:   (6.4 points, 5.0 required)

 pts rule name              description
---- ---------------------- --------------------------------------------------
 1.5 HTML_MESSAGE           BODY: HTML included in message
 4.9 BAYES_99               BODY: Bayes spam probability is 99 to 100%
                            [score: 1.0000]
";

/// Well-formed report using the X-Spam-Report header layout (score 0.9).
#[allow(dead_code)]
pub const HAM_REPORT: &str = "\
X-Spam-Status: No, score=0.9 required=5.0 tests=RDNS_NONE
X-Spam-Report:
\t*  0.9 RDNS_NONE Delivered to internal network by a host with no rDNS
Subject: hello
";

/// Content the parser rejects.
#[allow(dead_code)]
pub const MALFORMED_REPORT: &str = "Hello,\n\nthis message carries no spam analysis.\n";
